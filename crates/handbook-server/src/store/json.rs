use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use handbook_shared::{NodeDocument, PageTree};
use tokio::fs;

use super::StoreError;

/// The whole forest as one nested JSON array.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty handbook.
    pub async fn load(&self) -> Result<PageTree, StoreError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("{} does not exist yet", self.path.display());
                return Ok(PageTree::new());
            }
            Err(e) => return Err(e.into()),
        };

        let docs: Vec<NodeDocument> = serde_json::from_slice(&bytes)?;
        Ok(PageTree::from_documents(&docs)?)
    }

    /// Writes a sibling temp file and renames it over the target, so readers
    /// never observe a half-written document.
    pub async fn save(&self, tree: &PageTree) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(&tree.to_documents())?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;

        tracing::debug!("Saved {} node(s) to {}", tree.len(), self.path.display());
        Ok(())
    }
}
