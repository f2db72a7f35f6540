//! Loader implementations.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::errors::LoadError;
use crate::traits::{KeywordLibrary, LibraryLoader};

/// Factory producing a component instance for a loader spec.
pub type LibraryFactory = Arc<dyn Fn() -> Arc<dyn KeywordLibrary> + Send + Sync>;

/// Loader over an explicit name-to-factory table built at startup.
///
/// Register every loadable component before handing the loader to the
/// registry; an unregistered spec fails with `LoadError::UnknownSpec`.
#[derive(Default)]
pub struct StaticLoader {
    factories: HashMap<String, LibraryFactory>,
}

impl StaticLoader {
    /// An empty loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `spec`, replacing any previous entry.
    pub fn register<F>(&mut self, spec: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<dyn KeywordLibrary> + Send + Sync + 'static,
    {
        let _ = self.factories.insert(spec.into(), Arc::new(factory));
    }

    /// Registered spec names, sorted.
    #[must_use]
    pub fn specs(&self) -> Vec<String> {
        let mut specs: Vec<String> = self.factories.keys().cloned().collect();
        specs.sort();
        specs
    }
}

impl LibraryLoader for StaticLoader {
    fn load(&self, spec: &str) -> Result<Arc<dyn KeywordLibrary>, LoadError> {
        match self.factories.get(spec) {
            Some(factory) => Ok(factory()),
            None => {
                debug!(spec, "no factory registered");
                Err(LoadError::UnknownSpec {
                    spec: spec.to_string(),
                })
            }
        }
    }
}
