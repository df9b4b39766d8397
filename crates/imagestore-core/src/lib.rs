//! Imagestore Core
//!
//! Shared vocabulary for the imagestore crates: the error type, object and
//! cache metadata, and the port traits that object-store adapters implement.
//! This crate has minimal dependencies and performs no I/O of its own.

pub mod error;
pub mod metadata;
pub mod object;
pub mod ports;
pub mod stream;

pub use error::{Error, Result};
pub use metadata::{CacheMetadata, ObjectHead, ObjectMetadata};
pub use object::ObjectRef;
pub use ports::{ByteStream, FormatSniffer, ObjectStore, UploadOptions};
