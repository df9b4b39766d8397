//! Registry of named containers.

use imagestore_core::{Error, ObjectStore, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Path separators recognized in request paths and container names.
pub(crate) const SEPARATORS: &[char] = &['/', '\\'];

/// A named container bound to the store client that serves it.
#[derive(Clone)]
pub struct Container {
    name: String,
    store: Arc<dyn ObjectStore>,
}

impl Container {
    pub fn new(name: impl Into<String>, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            name: name.into(),
            store,
        }
    }

    /// Name as registered.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("name", &self.name)
            .field("store", &self.store.name())
            .finish()
    }
}

/// Case-insensitive mapping from container name to [`Container`].
///
/// Populated once at startup and shared read-only afterwards, typically
/// behind an `Arc`.
#[derive(Debug, Default)]
pub struct ContainerRegistry {
    containers: Vec<Container>,
    index: HashMap<String, usize>,
}

impl ContainerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a container.
    ///
    /// Fails if a container with the same name, ignoring case, is already
    /// registered, or if the name is blank or contains a path separator.
    pub fn register(&mut self, name: &str, store: Arc<dyn ObjectStore>) -> Result<()> {
        if name.trim().is_empty() || name.contains(SEPARATORS) {
            return Err(Error::InvalidContainerName(name.to_string()));
        }

        let folded = fold(name);
        if let Some(&existing) = self.index.get(&folded) {
            return Err(Error::DuplicateContainer(format!(
                "{} (conflicts with {})",
                name, self.containers[existing].name
            )));
        }

        info!(container = %name, store = %store.name(), "Registering container");
        self.index.insert(folded, self.containers.len());
        self.containers.push(Container::new(name, store));
        Ok(())
    }

    /// Look up a container by exact name, ignoring case.
    pub fn resolve(&self, name: &str) -> Option<&Container> {
        self.index
            .get(&fold(name))
            .map(|&position| &self.containers[position])
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.containers.iter().map(Container::name)
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}

/// Comparison key for container names.
fn fold(name: &str) -> String {
    name.to_lowercase()
}
