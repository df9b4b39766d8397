//! Object resolution and per-object handles.

use crate::registry::Container;
use crate::timeout::bounded;
use imagestore_core::{
    ByteStream, Error, ObjectHead, ObjectMetadata, ObjectRef, ObjectStore, Result,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// One object in one container, plus the store that serves it.
#[derive(Clone)]
pub(crate) struct ObjectTarget {
    store: Arc<dyn ObjectStore>,
    object: ObjectRef,
    timeout: Option<Duration>,
}

impl ObjectTarget {
    pub(crate) fn new(store: Arc<dyn ObjectStore>, object: ObjectRef, timeout: Option<Duration>) -> Self {
        Self {
            store,
            object,
            timeout,
        }
    }

    pub(crate) fn object(&self) -> &ObjectRef {
        &self.object
    }

    /// Existence probe. `Ok(None)` when the object is absent.
    pub(crate) async fn probe(&self) -> Result<Option<ObjectHead>> {
        bounded(
            self.timeout,
            "head",
            self.store.head(&self.object.container, &self.object.key),
        )
        .await
    }

    /// Metadata of an object already known to exist.
    pub(crate) async fn head(&self) -> Result<ObjectHead> {
        self.probe()
            .await?
            .ok_or_else(|| Error::NotFound(self.object.to_string()))
    }

    pub(crate) async fn open_read(&self) -> Result<ByteStream> {
        bounded(
            self.timeout,
            "open_read",
            self.store.open_read(&self.object.container, &self.object.key),
        )
        .await
    }
}

/// Resolves `(container, key)` pairs into [`ObjectHandle`]s.
#[derive(Debug, Clone, Default)]
pub struct ContentResolver {
    timeout: Option<Duration>,
}

impl ContentResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound every store round-trip made through this resolver.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Probe for `key` in `container` and return a handle if it exists.
    ///
    /// A missing object yields `Ok(None)`; transport failures are returned
    /// unchanged.
    pub async fn resolve(&self, container: &Container, key: &str) -> Result<Option<ObjectHandle>> {
        let target = ObjectTarget::new(
            container.store().clone(),
            ObjectRef::new(container.name(), key),
            self.timeout,
        );

        match target.probe().await? {
            Some(_) => Ok(Some(ObjectHandle { target })),
            None => {
                debug!(container = %container.name(), key = %key, "Object not found");
                Ok(None)
            }
        }
    }
}

/// Handle to an existing source image.
///
/// Construction performs no I/O. Each call to [`ObjectHandle::metadata`] or
/// [`ObjectHandle::open_read`] is one store round-trip.
#[derive(Clone)]
pub struct ObjectHandle {
    target: ObjectTarget,
}

impl ObjectHandle {
    pub fn object(&self) -> &ObjectRef {
        self.target.object()
    }

    /// Fetch current metadata. `max_age` is always unset for source images.
    pub async fn metadata(&self) -> Result<ObjectMetadata> {
        Ok(self.target.head().await?.into())
    }

    /// Open a stream over the object's bytes. The caller owns the stream.
    pub async fn open_read(&self) -> Result<ByteStream> {
        self.target.open_read().await
    }
}

impl std::fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectHandle")
            .field("object", self.object())
            .finish()
    }
}
