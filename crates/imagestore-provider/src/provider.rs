//! Image content provider: routes request paths to source images.

use crate::registry::ContainerRegistry;
use crate::resolver::{ContentResolver, ObjectHandle};
use crate::router::PathRouter;
use imagestore_core::{FormatSniffer, Result};
use std::sync::Arc;
use tracing::debug;

/// Replacement for the default candidate check.
pub type MatchFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Which requests the pipeline may process for images from a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingBehavior {
    /// Serve source images untouched.
    None,
    /// Process only requests that carry processing commands.
    CommandOnly,
    /// Process every request.
    #[default]
    All,
}

/// Serves source images from the registered containers.
pub struct ImageContentProvider {
    router: PathRouter,
    resolver: ContentResolver,
    formats: Arc<dyn FormatSniffer>,
    match_override: Option<MatchFn>,
    behavior: ProcessingBehavior,
}

impl ImageContentProvider {
    pub fn new(registry: Arc<ContainerRegistry>, formats: Arc<dyn FormatSniffer>) -> Self {
        Self {
            router: PathRouter::new(registry),
            resolver: ContentResolver::new(),
            formats,
            match_override: None,
            behavior: ProcessingBehavior::default(),
        }
    }

    /// Use `resolver` for existence probes and handles.
    pub fn with_resolver(mut self, resolver: ContentResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replace the default candidate check used by [`ImageContentProvider::matches`].
    pub fn with_match(mut self, predicate: MatchFn) -> Self {
        self.match_override = Some(predicate);
        self
    }

    /// Restrict which requests the pipeline may process. Defaults to
    /// [`ProcessingBehavior::All`].
    pub fn with_processing_behavior(mut self, behavior: ProcessingBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn processing_behavior(&self) -> ProcessingBehavior {
        self.behavior
    }

    /// Whether this provider should be asked for `path` at all.
    pub fn matches(&self, path: &str) -> bool {
        match &self.match_override {
            Some(predicate) => predicate(path),
            None => self.router.is_candidate(path),
        }
    }

    /// Whether `display_url` names an image format the pipeline understands.
    pub fn is_valid_request(&self, display_url: &str) -> bool {
        self.formats.extension_from_url(display_url).is_some()
    }

    /// Resolve `path` to a handle on an existing source image.
    ///
    /// Unmatched paths, bare container names and missing objects all yield
    /// `Ok(None)`. Store failures are returned unchanged.
    pub async fn get(&self, path: &str) -> Result<Option<ObjectHandle>> {
        let Some(object) = self.router.match_path(path) else {
            debug!(path = %path, "No container matches path");
            return Ok(None);
        };

        let Some(container) = self.router.registry().resolve(&object.container) else {
            return Ok(None);
        };

        self.resolver.resolve(container, &object.key).await
    }

    pub fn router(&self) -> &PathRouter {
        &self.router
    }
}
