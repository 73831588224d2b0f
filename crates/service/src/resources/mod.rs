//! The resource collection and the operations exposed over it.

use async_trait::async_trait;

use crate::errors::ServiceError;

pub mod model;
pub mod store;

pub use model::{Collection, Resource, ResourceId};
pub use store::{ResourceStore, StoreOptions};

/// CRUD capability over the single resource collection.
///
/// Implementations must serialize mutations against each other; callers may
/// invoke these from many tasks at once.
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    async fn read(&self) -> Result<Collection, ServiceError>;
    async fn create(&self, record: Resource) -> Result<(), ServiceError>;
    async fn update(&self, id: ResourceId, patch: Resource) -> Result<(), ServiceError>;
    async fn delete(&self, id: ResourceId) -> Result<(), ServiceError>;
}
