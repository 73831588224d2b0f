use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::DocumentBackend;
use crate::errors::ServiceError;

/// In-process document, mainly for tests and embedding.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<RwLock<Option<Vec<u8>>>>,
}

impl MemoryBackend {
    /// Backend holding an empty collection.
    pub fn new() -> Self {
        Self::with_bytes(b"[]".to_vec())
    }

    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self { inner: Arc::new(RwLock::new(Some(bytes.into()))) }
    }

    /// Backend with no document at all; every load fails like a missing file.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Current raw document, if any.
    pub async fn snapshot(&self) -> Option<Vec<u8>> {
        self.inner.read().await.clone()
    }
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
    async fn load(&self) -> Result<Vec<u8>, ServiceError> {
        self.inner
            .read()
            .await
            .clone()
            .ok_or_else(|| ServiceError::Io("document does not exist".into()))
    }

    async fn save(&self, bytes: &[u8]) -> Result<(), ServiceError> {
        *self.inner.write().await = Some(bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_then_load() -> Result<(), ServiceError> {
        let backend = MemoryBackend::new();
        assert_eq!(backend.load().await?, b"[]");
        backend.save(b"[1]").await?;
        assert_eq!(backend.load().await?, b"[1]");
        assert_eq!(backend.snapshot().await.as_deref(), Some(&b"[1]"[..]));
        Ok(())
    }

    #[tokio::test]
    async fn empty_backend_fails_to_load() {
        assert!(matches!(MemoryBackend::empty().load().await, Err(ServiceError::Io(_))));
    }
}
