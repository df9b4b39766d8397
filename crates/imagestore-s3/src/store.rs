//! [`ObjectStore`] implementation over `aws-sdk-s3`.

use crate::options::S3ClientOptions;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::primitives::{ByteStream as S3Body, DateTime as S3DateTime};
use aws_sdk_s3::types::ObjectCannedAcl;
use chrono::{DateTime, Utc};
use futures::stream;
use imagestore_core::{
    ByteStream, Error, ObjectHead, ObjectStore, Result, UploadOptions, stream as body,
};
use std::fmt;
use tracing::{debug, warn};

/// S3-compatible object store. One instance serves every bucket behind its endpoint.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    endpoint: String,
    public_read: bool,
}

impl S3ObjectStore {
    /// Build a client from static credentials. Performs no I/O.
    pub fn new(options: &S3ClientOptions) -> Self {
        let endpoint = options.endpoint_url();
        let credentials = Credentials::new(
            options.access_key_id.clone(),
            options.secret_access_key.clone(),
            None,
            None,
            "imagestore",
        );

        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(options.region.clone()))
            .endpoint_url(&endpoint)
            .credentials_provider(credentials)
            .force_path_style(options.force_path_style)
            .build();

        debug!(endpoint = %endpoint, region = %options.region, "Created S3 client");
        Self::from_client(Client::from_conf(config), endpoint).with_public_read(options.public_read)
    }

    /// Wrap an already configured client.
    pub fn from_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            public_read: false,
        }
    }

    /// Upload objects with the `public-read` canned ACL.
    pub fn with_public_read(mut self, public_read: bool) -> Self {
        self.public_read = public_read;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl fmt::Debug for S3ObjectStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3ObjectStore")
            .field("endpoint", &self.endpoint)
            .field("public_read", &self.public_read)
            .finish()
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn head(&self, container: &str, key: &str) -> Result<Option<ObjectHead>> {
        let output = match self
            .client
            .head_object()
            .bucket(container)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) if err.as_service_error().is_some_and(HeadObjectError::is_not_found) => {
                return Ok(None);
            }
            Err(err) => return Err(unavailable("head_object", container, key, err)),
        };

        let last_modified = output
            .last_modified()
            .and_then(to_utc)
            .ok_or_else(|| Error::StoreUnavailable(format!(
                "head_object {}/{}: response has no Last-Modified",
                container, key
            )))?;

        Ok(Some(ObjectHead {
            last_modified,
            content_length: output.content_length().unwrap_or_default().max(0) as u64,
            content_type: output.content_type().map(str::to_string),
            user_metadata: output
                .metadata()
                .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                .unwrap_or_default(),
        }))
    }

    async fn open_read(&self, container: &str, key: &str) -> Result<ByteStream> {
        let output = self
            .client
            .get_object()
            .bucket(container)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                if err.as_service_error().is_some_and(GetObjectError::is_no_such_key) {
                    Error::NotFound(format!("{}/{}", container, key))
                } else {
                    unavailable("get_object", container, key, err)
                }
            })?;

        Ok(into_byte_stream(output.body))
    }

    async fn upload(
        &self,
        container: &str,
        key: &str,
        body: ByteStream,
        options: UploadOptions,
    ) -> Result<()> {
        let data = body::collect(body).await?;
        let size = data.len();

        let mut request = self
            .client
            .put_object()
            .bucket(container)
            .key(key)
            .body(S3Body::from(data));

        if let Some(content_type) = options.content_type {
            request = request.content_type(content_type);
        }
        for (name, value) in options.metadata {
            request = request.metadata(name, value);
        }
        if self.public_read {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }

        request
            .send()
            .await
            .map_err(|err| unavailable("put_object", container, key, err))?;

        debug!(bucket = %container, key = %key, bytes = size, "Uploaded object");
        Ok(())
    }

    fn name(&self) -> &str {
        "s3"
    }
}

fn unavailable<E>(operation: &str, container: &str, key: &str, err: E) -> Error
where
    E: std::error::Error,
{
    let message = format!("{} {}/{}: {}", operation, container, key, DisplayErrorContext(&err));
    warn!(error = %message, "S3 request failed");
    Error::StoreUnavailable(message)
}

fn to_utc(ts: &S3DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts.secs(), ts.subsec_nanos())
}

fn into_byte_stream(body: S3Body) -> ByteStream {
    Box::pin(stream::unfold(Some(body), |state| async move {
        let mut body = state?;
        match body.try_next().await {
            Ok(Some(chunk)) => Some((Ok(chunk), Some(body))),
            Ok(None) => None,
            // Yield the error once, then end the stream.
            Err(err) => Some((Err(Error::StoreUnavailable(err.to_string())), None)),
        }
    }))
}
