//! Keyword registry: loading, lookup, listing, and execution.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use rfremote_core::{RunResult, Value};

use crate::coerce;
use crate::descriptor::{Keyword, KeywordSpec, ParamKind, ReturnKind};
use crate::docs::DocOverlay;
use crate::engine;
use crate::errors::{LoadError, LookupError};
use crate::traits::LibraryLoader;

/// Keywords of one loaded library, in first-registered order.
struct LoadedLibrary {
    keywords: Vec<Arc<Keyword>>,
    by_name: HashMap<String, usize>,
}

/// Registry of keyword libraries exposed to remote clients.
///
/// Shared behind `Arc`. Loading takes the write lock and serving takes
/// read locks, so a load never races in-flight lookups or runs.
pub struct KeywordRegistry {
    loader: Arc<dyn LibraryLoader>,
    libraries: RwLock<HashMap<String, Arc<LoadedLibrary>>>,
}

impl KeywordRegistry {
    /// An empty registry resolving loader specs through `loader`.
    #[must_use]
    pub fn new(loader: Arc<dyn LibraryLoader>) -> Self {
        Self {
            loader,
            libraries: RwLock::new(HashMap::new()),
        }
    }

    /// Loads the component `spec` names and exposes its eligible keywords
    /// under `library`.
    ///
    /// Loading an already-loaded library is a no-op. Every failure leaves
    /// the registry untouched: the whole load is all-or-nothing.
    pub fn load_library(
        &self,
        library: &str,
        spec: &str,
        docs: Option<&Path>,
    ) -> Result<(), LoadError> {
        if spec.trim().is_empty() {
            return Err(LoadError::EmptySpec);
        }
        if self.libraries.read().contains_key(library) {
            debug!(library, "already loaded, skipping");
            return Ok(());
        }

        let overlay = match docs {
            Some(path) => Some(DocOverlay::from_file(path)?),
            None => None,
        };
        let component = self.loader.load(spec)?;
        let loaded = build_library(library, component.keywords(), overlay.as_ref())?;
        let count = loaded.keywords.len();

        let mut libraries = self.libraries.write();
        if libraries.contains_key(library) {
            debug!(library, "loaded concurrently, skipping");
            return Ok(());
        }
        let _ = libraries.insert(library.to_string(), Arc::new(loaded));
        drop(libraries);

        info!(library, spec, keywords = count, "library loaded");
        Ok(())
    }

    /// Looks up a keyword by friendly name, case-insensitively.
    pub fn keyword(&self, library: &str, name: &str) -> Result<Arc<Keyword>, LookupError> {
        let libraries = self.libraries.read();
        let lib = libraries
            .get(library)
            .ok_or_else(|| LookupError::UnknownLibrary(library.to_string()))?;
        let needle = name.to_lowercase();
        lib.by_name
            .get(&needle)
            .map(|&i| Arc::clone(&lib.keywords[i]))
            .ok_or_else(|| LookupError::UnknownKeyword {
                library: library.to_string(),
                name: name.to_string(),
            })
    }

    /// Friendly names of a library's keywords, in first-registered order.
    pub fn keyword_names(&self, library: &str) -> Result<Vec<String>, LookupError> {
        let libraries = self.libraries.read();
        let lib = libraries
            .get(library)
            .ok_or_else(|| LookupError::UnknownLibrary(library.to_string()))?;
        Ok(lib.keywords.iter().map(|k| k.name().to_string()).collect())
    }

    /// Identifiers of every loaded library, sorted.
    #[must_use]
    pub fn library_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.libraries.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Whether a library is loaded under `library`.
    #[must_use]
    pub fn is_loaded(&self, library: &str) -> bool {
        self.libraries.read().contains_key(library)
    }

    /// Every loaded library with its keywords, sorted by library name.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(String, Vec<Arc<Keyword>>)> {
        let libraries = self.libraries.read();
        let mut all: Vec<(String, Vec<Arc<Keyword>>)> = libraries
            .iter()
            .map(|(name, lib)| (name.clone(), lib.keywords.clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    /// Runs `name` from `library` with `args`.
    ///
    /// Never raises: resolution failures, arity and coercion problems, and
    /// handler errors all come back as a FAIL result.
    #[must_use]
    pub fn run_keyword(&self, library: &str, name: &str, args: &[Value]) -> RunResult {
        match self.keyword(library, name) {
            Ok(keyword) => engine::execute(&keyword, args),
            Err(err) => {
                debug!(library, name, "run refused: {err}");
                RunResult::fail(err.to_string())
            }
        }
    }
}

/// Filters, validates, and indexes a component's declared keywords.
fn build_library(
    library: &str,
    specs: Vec<KeywordSpec>,
    overlay: Option<&DocOverlay>,
) -> Result<LoadedLibrary, LoadError> {
    let mut keywords: Vec<Arc<Keyword>> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();

    for mut spec in specs {
        if let Some(reason) = ineligibility(&spec) {
            debug!(library, ident = spec.ident(), reason, "keyword skipped");
            continue;
        }
        validate_params(&spec)?;
        if let Some(entry) = overlay.and_then(|o| o.entry(spec.ident())) {
            if let Some(doc) = &entry.doc {
                spec.doc.clone_from(doc);
            }
            for param in &mut spec.params {
                if let Some(doc) = entry.args.get(&param.name) {
                    param.doc.clone_from(doc);
                }
            }
        }

        let keyword = Keyword::from_spec(spec);
        let name = keyword.name().to_string();
        if by_name.contains_key(&name) {
            return Err(LoadError::DuplicateName {
                library: library.to_string(),
                name,
            });
        }
        let _ = by_name.insert(name, keywords.len());
        keywords.push(Arc::new(keyword));
    }

    Ok(LoadedLibrary { keywords, by_name })
}

/// Why a spec is excluded from the remote surface, if it is.
fn ineligibility(spec: &KeywordSpec) -> Option<&'static str> {
    if spec.hidden {
        return Some("hidden");
    }
    if spec.deprecated {
        return Some("deprecated");
    }
    if matches!(spec.returns, ReturnKind::Opaque(_)) {
        return Some("opaque return");
    }
    if spec
        .params
        .iter()
        .any(|p| matches!(p.kind, ParamKind::Opaque(_)))
    {
        return Some("opaque parameter");
    }
    None
}

/// Rejects misplaced required parameters and defaults that do not fit
/// their declared kind.
fn validate_params(spec: &KeywordSpec) -> Result<(), LoadError> {
    let mut seen_optional = false;
    for param in &spec.params {
        match &param.default {
            Some(default) => {
                seen_optional = true;
                if coerce::coerce(default, &param.kind).is_err() {
                    return Err(LoadError::BadDefault {
                        ident: spec.ident().to_string(),
                        param: param.name.clone(),
                    });
                }
            }
            None if seen_optional => {
                return Err(LoadError::TrailingRequired {
                    ident: spec.ident().to_string(),
                    param: param.name.clone(),
                });
            }
            None => {}
        }
    }
    Ok(())
}
