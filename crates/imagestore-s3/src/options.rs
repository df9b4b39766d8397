//! Client options for S3-compatible endpoints.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection options for one S3-compatible endpoint.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct S3ClientOptions {
    /// Service host, with or without scheme (e.g. `nyc3.digitaloceanspaces.com`).
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Signing region. S3-compatible services usually accept any value.
    #[serde(default = "default_region")]
    pub region: String,
    /// Address buckets as `endpoint/bucket` rather than `bucket.endpoint`.
    #[serde(default = "default_force_path_style")]
    pub force_path_style: bool,
    /// Upload objects with the `public-read` canned ACL.
    #[serde(default)]
    pub public_read: bool,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_force_path_style() -> bool {
    true
}

impl S3ClientOptions {
    pub fn new(
        endpoint: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: default_region(),
            force_path_style: default_force_path_style(),
            public_read: false,
        }
    }

    /// Set the signing region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Enable or disable the `public-read` ACL on uploads.
    pub fn with_public_read(mut self, public_read: bool) -> Self {
        self.public_read = public_read;
        self
    }

    /// Endpoint as a URL. A bare host is assumed to speak HTTPS.
    pub fn endpoint_url(&self) -> String {
        let endpoint = self.endpoint.trim().trim_end_matches('/');
        if endpoint.contains("://") {
            endpoint.to_string()
        } else {
            format!("https://{}", endpoint)
        }
    }
}

impl fmt::Debug for S3ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3ClientOptions")
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field("region", &self.region)
            .field("force_path_style", &self.force_path_style)
            .field("public_read", &self.public_read)
            .finish()
    }
}
