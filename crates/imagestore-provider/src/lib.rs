//! Bucket routing, object resolution and caching for imagestore.
//!
//! Request paths are routed to one of several registered containers by
//! exact first-segment match, objects are probed for existence before a
//! handle is returned, and processed artifacts are cached in a single
//! designated container.

pub mod cache;
pub mod formats;
pub mod memory;
pub mod provider;
pub mod registry;
pub mod resolver;
pub mod router;
mod timeout;

pub use cache::{CacheHandle, ObjectCache};
pub use formats::{DEFAULT_EXTENSIONS, ExtensionSniffer};
pub use memory::InMemoryObjectStore;
pub use provider::{ImageContentProvider, MatchFn, ProcessingBehavior};
pub use registry::{Container, ContainerRegistry};
pub use resolver::{ContentResolver, ObjectHandle};
pub use router::PathRouter;
