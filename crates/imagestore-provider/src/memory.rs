//! In-memory object store for tests and local development.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use imagestore_core::{
    ByteStream, Error, ObjectHead, ObjectStore, Result, UploadOptions, stream,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    head: ObjectHead,
}

/// HashMap-backed [`ObjectStore`].
///
/// Objects are keyed by `(container, key)`; containers spring into existence
/// on first upload. Failure and latency can be injected to exercise error
/// paths.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<(String, String), StoredObject>>,
    unavailable: RwLock<Option<String>>,
    latency: RwLock<Option<Duration>>,
    head_calls: AtomicUsize,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `StoreUnavailable(reason)`.
    /// Pass `None` to restore normal operation.
    pub async fn set_unavailable(&self, reason: Option<&str>) {
        *self.unavailable.write().await = reason.map(str::to_string);
    }

    /// Delay every subsequent call by `latency`.
    pub async fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.write().await = latency;
    }

    /// Number of `head` calls served so far.
    pub fn head_calls(&self) -> usize {
        self.head_calls.load(Ordering::SeqCst)
    }

    /// Remove an object. Returns `true` if it existed.
    pub async fn remove(&self, container: &str, key: &str) -> bool {
        self.objects
            .write()
            .await
            .remove(&(container.to_string(), key.to_string()))
            .is_some()
    }

    /// Number of objects across all containers.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    async fn enter(&self) -> Result<()> {
        let latency = *self.latency.read().await;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        match self.unavailable.read().await.as_deref() {
            Some(reason) => Err(Error::StoreUnavailable(reason.to_string())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn head(&self, container: &str, key: &str) -> Result<Option<ObjectHead>> {
        self.head_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await?;

        let objects = self.objects.read().await;
        Ok(objects
            .get(&(container.to_string(), key.to_string()))
            .map(|object| object.head.clone()))
    }

    async fn open_read(&self, container: &str, key: &str) -> Result<ByteStream> {
        self.enter().await?;

        let objects = self.objects.read().await;
        let object = objects
            .get(&(container.to_string(), key.to_string()))
            .ok_or_else(|| Error::NotFound(format!("{}/{}", container, key)))?;
        Ok(stream::once(object.data.clone()))
    }

    async fn upload(
        &self,
        container: &str,
        key: &str,
        body: ByteStream,
        options: UploadOptions,
    ) -> Result<()> {
        self.enter().await?;

        let data = stream::collect(body).await?;
        let head = ObjectHead {
            last_modified: Utc::now(),
            content_length: data.len() as u64,
            content_type: options.content_type,
            user_metadata: options.metadata,
        };

        debug!(container = %container, key = %key, bytes = data.len(), "Stored object in memory");
        self.objects
            .write()
            .await
            .insert((container.to_string(), key.to_string()), StoredObject { data, head });
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
