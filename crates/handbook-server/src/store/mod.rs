//! Persistence for the page tree.
//!
//! Both backends load and save the whole forest; the tree itself is the
//! only place where structural rules are enforced.

mod json;
mod sql;

use handbook_shared::{PageTree, TreeError};

pub use json::JsonFileStore;
pub use sql::SqlPageStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed page document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stored pages are inconsistent: {0}")]
    Tree(#[from] TreeError),
}

#[derive(Debug, Clone)]
pub enum PageStore {
    Json(JsonFileStore),
    Sql(SqlPageStore),
}

impl PageStore {
    pub async fn load(&self) -> Result<PageTree, StoreError> {
        match self {
            PageStore::Json(store) => store.load().await,
            PageStore::Sql(store) => store.load().await,
        }
    }

    pub async fn save(&self, tree: &PageTree) -> Result<(), StoreError> {
        match self {
            PageStore::Json(store) => store.save(tree).await,
            PageStore::Sql(store) => store.save(tree).await,
        }
    }
}

impl From<JsonFileStore> for PageStore {
    fn from(store: JsonFileStore) -> Self {
        PageStore::Json(store)
    }
}

impl From<SqlPageStore> for PageStore {
    fn from(store: SqlPageStore) -> Self {
        PageStore::Sql(store)
    }
}
