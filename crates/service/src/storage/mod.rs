//! Storage abstractions for the service layer
//!
//! A backend only moves whole documents in and out; parsing and the
//! collection semantics live in `crate::resources`.

use async_trait::async_trait;

use crate::errors::ServiceError;

pub mod file_backend;
pub mod memory_backend;

pub use file_backend::FileBackend;
pub use memory_backend::MemoryBackend;

/// Whole-document persistence medium.
///
/// `save` must replace the document so that a concurrent `load` returns
/// either the previous or the new bytes, never a mix.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    async fn load(&self) -> Result<Vec<u8>, ServiceError>;
    async fn save(&self, bytes: &[u8]) -> Result<(), ServiceError>;
}
