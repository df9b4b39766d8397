//! Port traits (hexagonal architecture).
//!
//! These traits define the interfaces between the routing/cache layer and
//! the external collaborators it consumes: the object store transport and
//! the image format recognizer.

use crate::Result;
use crate::metadata::ObjectHead;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::collections::BTreeMap;
use std::pin::Pin;

/// Stream of object bytes. Dropping it releases the underlying connection.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Options attached to an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    /// Content type recorded with the object.
    pub content_type: Option<String>,
    /// User metadata recorded with the object.
    pub metadata: BTreeMap<String, String>,
}

/// Object store capability.
///
/// Implementations are shared between in-flight requests and must be safe
/// for concurrent use. Transport and auth failures are reported as
/// [`crate::Error::StoreUnavailable`]; retries, if any, happen inside the
/// implementation.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch object metadata. Returns `Ok(None)` if the object does not exist.
    async fn head(&self, container: &str, key: &str) -> Result<Option<ObjectHead>>;

    /// Open a read stream over the object's bytes.
    async fn open_read(&self, container: &str, key: &str) -> Result<ByteStream>;

    /// Upload an object, replacing any existing object at `key`.
    async fn upload(
        &self,
        container: &str,
        key: &str,
        body: ByteStream,
        options: UploadOptions,
    ) -> Result<()>;

    /// Store name for logging.
    fn name(&self) -> &str;
}

/// Recognizes image formats from request URLs.
pub trait FormatSniffer: Send + Sync {
    /// Return the recognized extension for `url`, or `None`.
    fn extension_from_url(&self, url: &str) -> Option<String>;
}
