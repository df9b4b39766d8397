//! Wires configured stores into a provider and cache.

use crate::config::Settings;
use imagestore_core::{ObjectStore, Result};
use imagestore_provider::{
    ContainerRegistry, ContentResolver, ExtensionSniffer, ImageContentProvider, ObjectCache,
};
use imagestore_s3::{S3ClientOptions, S3ObjectStore};
use std::sync::Arc;
use tracing::info;

/// Builds a store client from connection options.
pub type StoreFactory = dyn Fn(&S3ClientOptions) -> Arc<dyn ObjectStore>;

/// Startup-built provider and cache.
pub struct Runtime {
    pub provider: ImageContentProvider,
    pub cache: Option<ObjectCache>,
}

impl Runtime {
    /// Build against S3-compatible endpoints.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::build(settings, &|options: &S3ClientOptions| -> Arc<dyn ObjectStore> {
            Arc::new(S3ObjectStore::new(options))
        })
    }

    /// Build with a custom store factory. Fails on duplicate container names.
    pub fn build(settings: &Settings, factory: &StoreFactory) -> Result<Self> {
        let mut registry = ContainerRegistry::new();
        for container in &settings.containers {
            registry.register(&container.name, factory(&container.client))?;
        }

        let mut resolver = ContentResolver::new();
        if let Some(timeout) = settings.operation_timeout() {
            resolver = resolver.with_timeout(timeout);
        }

        let provider = ImageContentProvider::new(
            Arc::new(registry),
            Arc::new(ExtensionSniffer::new(&settings.formats)),
        )
        .with_resolver(resolver);

        let cache = settings.cache.as_ref().map(|cache| {
            let object_cache = ObjectCache::new(factory(&cache.client), &cache.bucket_name);
            match settings.operation_timeout() {
                Some(timeout) => object_cache.with_timeout(timeout),
                None => object_cache,
            }
        });

        info!(
            containers = settings.containers.len(),
            cache = cache.is_some(),
            "Runtime initialized"
        );
        Ok(Self { provider, cache })
    }
}
