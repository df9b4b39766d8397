//! Request path routing.

use crate::registry::{ContainerRegistry, SEPARATORS};
use imagestore_core::ObjectRef;
use std::sync::Arc;
use tracing::trace;

/// Maps request paths to a `(container, key)` pair.
///
/// The first path segment selects the container by exact, case-insensitive
/// name equality. Prefix matching is only used by [`PathRouter::is_candidate`].
#[derive(Debug, Clone)]
pub struct PathRouter {
    registry: Arc<ContainerRegistry>,
}

impl PathRouter {
    pub fn new(registry: Arc<ContainerRegistry>) -> Self {
        Self { registry }
    }

    /// Resolve `raw_path` to a container and object key.
    ///
    /// Returns `None` when the first segment names no registered container
    /// or when nothing but whitespace follows the container name.
    pub fn match_path(&self, raw_path: &str) -> Option<ObjectRef> {
        let path = raw_path.trim_matches(SEPARATORS);
        let segment = first_segment(path);

        let container = self.registry.resolve(segment)?;

        let key = path[segment.len()..].trim_start_matches(SEPARATORS);
        if key.trim().is_empty() {
            trace!(container = %container.name(), "Path names a container without a key");
            return None;
        }

        Some(ObjectRef::new(container.name(), key))
    }

    /// Cheap check whether `raw_path` could belong to any registered container.
    ///
    /// Loose by design: `images-archive/x` is a candidate when only `images`
    /// is registered, but a path that [`PathRouter::match_path`] would route
    /// is always a candidate. Use `match_path` to select a container.
    pub fn is_candidate(&self, raw_path: &str) -> bool {
        let path = raw_path.trim_start_matches(SEPARATORS);
        if self.registry.resolve(first_segment(path)).is_some() {
            return true;
        }
        self.registry.names().any(|name| starts_with_folded(path, name))
    }

    pub fn registry(&self) -> &Arc<ContainerRegistry> {
        &self.registry
    }
}

fn first_segment(path: &str) -> &str {
    match path.find(SEPARATORS) {
        Some(end) => &path[..end],
        None => path,
    }
}

// Compared per char: case variants may differ in UTF-8 length.
fn starts_with_folded(path: &str, name: &str) -> bool {
    let mut chars = path.chars();
    name.chars().all(|expected| {
        chars
            .next()
            .is_some_and(|actual| actual.to_lowercase().eq(expected.to_lowercase()))
    })
}
