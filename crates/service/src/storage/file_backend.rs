use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info};

use super::DocumentBackend;
use crate::errors::ServiceError;

/// Single local JSON file holding the whole collection.
///
/// Writes go to `<file>.tmp` first and are renamed over the document, so
/// readers never see a partially written file.
#[derive(Debug, Clone)]
pub struct FileBackend {
    file_path: PathBuf,
    tmp_path: PathBuf,
}

impl FileBackend {
    /// Point at `path` without touching the filesystem.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        let file_path = path.into();
        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("json");
        let tmp_path = file_path.with_extension(format!("{ext}.tmp"));
        Self { file_path, tmp_path }
    }

    /// Prepare the backend: create the parent directory and, when
    /// `create_if_missing` is set, seed an empty collection if the file is absent.
    pub async fn open<P: Into<PathBuf>>(path: P, create_if_missing: bool) -> Result<Self, ServiceError> {
        let backend = Self::new(path);
        common::env::ensure_parent_dir(&backend.file_path)
            .await
            .map_err(|e| ServiceError::Io(e.to_string()))?;

        if create_if_missing && fs::metadata(&backend.file_path).await.is_err() {
            backend.save(b"[]").await?;
            info!(path = %backend.file_path.display(), "initialized empty resource collection");
        }
        Ok(backend)
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

#[async_trait]
impl DocumentBackend for FileBackend {
    async fn load(&self) -> Result<Vec<u8>, ServiceError> {
        fs::read(&self.file_path)
            .await
            .map_err(|e| ServiceError::Io(format!("read {}: {e}", self.file_path.display())))
    }

    async fn save(&self, bytes: &[u8]) -> Result<(), ServiceError> {
        fs::write(&self.tmp_path, bytes)
            .await
            .map_err(|e| ServiceError::Io(format!("write {}: {e}", self.tmp_path.display())))?;
        fs::rename(&self.tmp_path, &self.file_path)
            .await
            .map_err(|e| ServiceError::Io(format!("rename onto {}: {e}", self.file_path.display())))?;
        debug!(path = %self.file_path.display(), bytes = bytes.len(), "document saved");
        Ok(())
    }
}
