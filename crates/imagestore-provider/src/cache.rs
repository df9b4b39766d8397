//! Object-store backed cache for processed images.

use crate::registry::SEPARATORS;
use crate::resolver::ObjectTarget;
use crate::timeout::bounded;
use imagestore_core::{
    ByteStream, CacheMetadata, Error, ObjectRef, ObjectStore, Result, UploadOptions,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Pass-through cache stored in one designated container.
///
/// Entries are never expired or deleted here; `set` overwrites
/// unconditionally and concurrent writers to the same key race with
/// last-writer-wins semantics.
#[derive(Clone)]
pub struct ObjectCache {
    store: Arc<dyn ObjectStore>,
    container: String,
    timeout: Option<Duration>,
}

impl ObjectCache {
    pub fn new(store: Arc<dyn ObjectStore>, container: impl Into<String>) -> Self {
        Self {
            store,
            container: container.into(),
            timeout: None,
        }
    }

    /// Bound every store round-trip made through this cache.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    /// Look up a cached entry.
    ///
    /// Returns `Ok(None)` on a miss or for a blank key.
    pub async fn get(&self, key: &str) -> Result<Option<CacheHandle>> {
        let Some(key) = normalize_key(key) else {
            return Ok(None);
        };

        let target = self.target(key);
        match target.probe().await? {
            Some(_) => {
                debug!(container = %self.container, key = %key, "Cache hit");
                Ok(Some(CacheHandle { target }))
            }
            None => {
                debug!(container = %self.container, key = %key, "Cache miss");
                Ok(None)
            }
        }
    }

    /// Store `body` under `key` together with `metadata`.
    pub async fn set(&self, key: &str, body: ByteStream, metadata: &CacheMetadata) -> Result<()> {
        let key = normalize_key(key).ok_or_else(|| Error::InvalidKey(key.to_string()))?;

        let options = UploadOptions {
            content_type: Some(metadata.content_type.clone()),
            metadata: metadata.to_map(),
        };

        bounded(
            self.timeout,
            "upload",
            self.store.upload(&self.container, key, body, options),
        )
        .await?;

        info!(
            container = %self.container,
            key = %key,
            content_type = %metadata.content_type,
            "Cached object"
        );
        Ok(())
    }

    fn target(&self, key: &str) -> ObjectTarget {
        ObjectTarget::new(
            self.store.clone(),
            ObjectRef::new(&self.container, key),
            self.timeout,
        )
    }
}

impl std::fmt::Debug for ObjectCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectCache")
            .field("container", &self.container)
            .field("store", &self.store.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Handle to an existing cache entry. Construction performs no I/O.
#[derive(Clone)]
pub struct CacheHandle {
    target: ObjectTarget,
}

impl CacheHandle {
    pub fn object(&self) -> &ObjectRef {
        self.target.object()
    }

    /// Read back the metadata stored with the entry.
    pub async fn metadata(&self) -> Result<CacheMetadata> {
        let head = self.target.head().await?;
        CacheMetadata::from_map(&head.user_metadata)
    }

    /// Open a stream over the cached bytes. The caller owns the stream.
    pub async fn open_read(&self) -> Result<ByteStream> {
        self.target.open_read().await
    }
}

impl std::fmt::Debug for CacheHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheHandle")
            .field("object", self.object())
            .finish()
    }
}

fn normalize_key(key: &str) -> Option<&str> {
    let key = key.trim_start_matches(SEPARATORS);
    (!key.trim().is_empty()).then_some(key)
}
