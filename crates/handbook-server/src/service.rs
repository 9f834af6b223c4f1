use handbook_shared::{PageTree, TreeError};
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::store::PageStore;

/// Owns the page store and serializes every tree mutation.
///
/// Reads load a fresh tree without locking. Writes hold `write_lock` across
/// load, mutate and save, so two concurrent edits never overwrite each other.
#[derive(Debug)]
pub struct Handbook {
    store: PageStore,
    write_lock: Mutex<()>,
}

impl Handbook {
    pub fn new(store: impl Into<PageStore>) -> Self {
        Self {
            store: store.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &PageStore {
        &self.store
    }

    pub async fn read(&self) -> Result<PageTree, AppError> {
        Ok(self.store.load().await?)
    }

    /// Applies `f` to the current tree and persists the result. Nothing is
    /// saved when `f` fails.
    pub async fn mutate<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut PageTree) -> Result<T, TreeError>,
    {
        let _guard = self.write_lock.lock().await;

        let mut tree = self.store.load().await?;
        let value = f(&mut tree)?;
        self.store.save(&tree).await?;

        Ok(value)
    }
}
