use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("unsafe filename: {0}")]
    UnsafeName(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Disk-backed storage for uploaded documents.
///
/// Every upload is renamed to `{uuid}.{ext}` before it touches the
/// filesystem, so client-supplied names never become paths. The stored
/// name is what the files table records in its `filename` column.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Creates the storage rooted at `base_path`, creating the directory
    /// if it does not exist yet.
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base_path = base_path.into();
        tokio::fs::create_dir_all(&base_path).await?;

        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Writes `content` under a fresh UUID-based name and returns that name.
    /// Only the extension of `original_name` survives the rename.
    pub async fn save(&self, content: &[u8], original_name: &str) -> Result<String, StorageError> {
        let stored_name = Self::generate_stored_name(original_name);
        let file_path = self.base_path.join(&stored_name);

        tokio::fs::write(&file_path, content).await?;

        Ok(stored_name)
    }

    /// Reads a stored file back. Names that are not a single path
    /// component are rejected before any filesystem access.
    pub async fn load(&self, stored_name: &str) -> Result<Vec<u8>, StorageError> {
        if !Self::is_safe_name(stored_name) {
            return Err(StorageError::UnsafeName(stored_name.to_string()));
        }

        let file_path = self.base_path.join(stored_name);
        match tokio::fs::read(&file_path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(stored_name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// A stored name must stay inside the upload directory: no separators,
    /// no parent references, no control characters, not empty.
    pub fn is_safe_name(name: &str) -> bool {
        !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains('/')
            && !name.contains('\\')
            && !name.chars().any(|c| c.is_control())
    }

    pub fn generate_stored_name(original_name: &str) -> String {
        let uuid = Uuid::new_v4();
        let ext = Self::extract_extension(original_name);
        format!("{uuid}.{ext}")
    }

    /// Extension of the client filename, "bin" when there is none.
    /// Anything but ASCII alphanumerics falls back to "bin" too, so a
    /// generated name always passes `is_safe_name` and stays loadable.
    fn extract_extension(filename: &str) -> &str {
        Path::new(filename)
            .extension()
            .and_then(|s| s.to_str())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or("bin")
    }
}
