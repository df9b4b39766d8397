//! S3-compatible object store adapter for imagestore.
//!
//! Works against AWS S3 and S3-compatible services such as DigitalOcean
//! Spaces, Cloudflare R2 and MinIO. Transport concerns (signing, retries,
//! endpoint resolution) are left to `aws-sdk-s3`.

pub mod options;
pub mod store;

pub use options::S3ClientOptions;
pub use store::S3ObjectStore;
