use std::{future::Future, path::PathBuf, sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

use super::model::{decode_collection, encode_collection, merge, Collection, Resource, ResourceId};
use super::ResourceRepository;
use crate::errors::ServiceError;
use crate::storage::{DocumentBackend, FileBackend};

#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Report updates of absent ids as `NotFound` instead of ignoring them.
    pub strict: bool,
    /// Upper bound for reads, and for the lock wait and load of a mutation.
    /// The commit of a mutation is never cut short.
    pub op_timeout: Option<Duration>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self { strict: true, op_timeout: None }
    }
}

/// Resource collection persisted as one JSON document.
///
/// Every operation reloads the document; every effective mutation rewrites
/// it in full. Mutations hold `writer` for their whole read-modify-write
/// cycle, so no two of them interleave. Reads skip the lock and rely on the
/// backend replacing the document atomically.
///
/// A mutation that reports `Timeout` has written nothing. Once a save has
/// started it runs to completion in its own task, holding the writer lock,
/// even if the caller stops waiting.
pub struct ResourceStore {
    backend: Arc<dyn DocumentBackend>,
    writer: Arc<Mutex<()>>,
    options: StoreOptions,
}

impl ResourceStore {
    pub fn new(backend: Arc<dyn DocumentBackend>, options: StoreOptions) -> Arc<Self> {
        Arc::new(Self { backend, writer: Arc::new(Mutex::new(())), options })
    }

    /// File-backed store; see [`FileBackend::open`] for `create_if_missing`.
    pub async fn open_file<P: Into<PathBuf>>(
        path: P,
        create_if_missing: bool,
        options: StoreOptions,
    ) -> Result<Arc<Self>, ServiceError> {
        let backend = FileBackend::open(path, create_if_missing).await?;
        Ok(Self::new(Arc::new(backend), options))
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Load and parse the current collection.
    pub async fn read(&self) -> Result<Collection, ServiceError> {
        self.bounded("read", self.load()).await
    }

    /// Append `record`. Ids are not checked for uniqueness.
    pub async fn create(&self, record: Resource) -> Result<(), ServiceError> {
        self.mutate("create", move |collection| {
            collection.push(record);
            Ok(true)
        })
        .await
    }

    /// Shallow-merge `patch` into the first record with a matching id.
    pub async fn update(&self, id: ResourceId, patch: Resource) -> Result<(), ServiceError> {
        let strict = self.options.strict;
        self.mutate("update", move |collection| {
            match collection.iter_mut().find(|r| id.matches(r)) {
                Some(existing) => {
                    merge(existing, patch);
                    Ok(true)
                }
                None if strict => Err(ServiceError::not_found(&format!("resource {id}"))),
                None => {
                    debug!(%id, "update matched no resource; leaving collection untouched");
                    Ok(false)
                }
            }
        })
        .await
    }

    /// Remove every record with a matching id. Absent ids are not an error.
    pub async fn delete(&self, id: ResourceId) -> Result<(), ServiceError> {
        self.mutate("delete", move |collection| {
            let before = collection.len();
            collection.retain(|r| !id.matches(r));
            let removed = before - collection.len();
            debug!(%id, removed, "delete applied");
            Ok(removed > 0)
        })
        .await
    }

    async fn load(&self) -> Result<Collection, ServiceError> {
        let bytes = self.backend.load().await?;
        decode_collection(&bytes)
    }

    /// Read-modify-write under the writer lock. `apply` reports whether it
    /// changed the collection; unchanged collections are not rewritten.
    ///
    /// Lock wait, load and `apply` are bounded by the timeout. The save is
    /// spawned with the owned guard so it always finishes before the next
    /// writer gets in.
    async fn mutate<F>(&self, op: &'static str, apply: F) -> Result<(), ServiceError>
    where
        F: FnOnce(&mut Collection) -> Result<bool, ServiceError> + Send,
    {
        let (guard, collection) = match self.bounded(op, self.stage(apply)).await? {
            Some(staged) => staged,
            None => return Ok(()),
        };
        let bytes = encode_collection(&collection)?;
        let records = collection.len();
        let backend = Arc::clone(&self.backend);
        let commit = tokio::spawn(async move {
            let _guard = guard;
            backend.save(&bytes).await
        });
        commit
            .await
            .map_err(|e| ServiceError::Io(format!("{op} commit task failed: {e}")))??;
        debug!(op, records, "collection persisted");
        Ok(())
    }

    /// Take the writer lock, load and apply. `None` when nothing changed.
    async fn stage<F>(&self, apply: F) -> Result<Option<(OwnedMutexGuard<()>, Collection)>, ServiceError>
    where
        F: FnOnce(&mut Collection) -> Result<bool, ServiceError> + Send,
    {
        let guard = Arc::clone(&self.writer).lock_owned().await;
        let mut collection = self.load().await?;
        if apply(&mut collection)? {
            Ok(Some((guard, collection)))
        } else {
            Ok(None)
        }
    }

    async fn bounded<T, Fut>(&self, op: &'static str, fut: Fut) -> Result<T, ServiceError>
    where
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        match self.options.op_timeout {
            Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
                warn!(op, ?limit, "store operation timed out");
                ServiceError::Timeout(limit)
            })?,
            None => fut.await,
        }
    }
}

#[async_trait]
impl ResourceRepository for ResourceStore {
    async fn read(&self) -> Result<Collection, ServiceError> { self.read().await }
    async fn create(&self, record: Resource) -> Result<(), ServiceError> { self.create(record).await }
    async fn update(&self, id: ResourceId, patch: Resource) -> Result<(), ServiceError> { self.update(id, patch).await }
    async fn delete(&self, id: ResourceId) -> Result<(), ServiceError> { self.delete(id).await }
}
