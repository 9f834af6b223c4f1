use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

/// Public URL path under which uploaded files are served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Upload exceeds {0} bytes")]
    TooLarge(usize),

    #[error("Upload is empty")]
    Empty,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes uploaded files under generated names.
#[derive(Debug, Clone)]
pub struct MediaStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl MediaStore {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Stores `bytes` as `<uuid>.<ext>` and returns its public URL path.
    /// Only the extension of the client's file name is kept.
    pub async fn store(&self, file_name: Option<&str>, bytes: &[u8]) -> Result<String, MediaError> {
        if bytes.is_empty() {
            return Err(MediaError::Empty);
        }
        if bytes.len() > self.max_bytes {
            return Err(MediaError::TooLarge(self.max_bytes));
        }

        let name = match file_name.and_then(clean_extension) {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };

        fs::create_dir_all(&self.dir).await?;
        fs::write(self.dir.join(&name), bytes).await?;

        tracing::info!("Stored upload {} ({} bytes)", name, bytes.len());
        Ok(format!("{}/{}", UPLOADS_URL_PREFIX, name))
    }
}

fn clean_extension(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name).extension()?.to_str()?;
    let valid = !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then(|| ext.to_ascii_lowercase())
}
