//! Documentation overlay files.
//!
//! A load may name a JSON file that supplies or replaces keyword and
//! argument documentation, keyed by the original identifier:
//!
//! ```json
//! { "AddTwoNumbers": { "doc": "Adds a and b.", "args": { "a": "first addend" } } }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::errors::LoadError;

/// Documentation entry for one keyword.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeywordDocEntry {
    /// Keyword documentation; absent keeps the manifest's text.
    #[serde(default)]
    pub doc: Option<String>,
    /// Per-argument documentation, keyed by parameter name.
    #[serde(default)]
    pub args: HashMap<String, String>,
}

/// A parsed overlay, keyed by original keyword identifier.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct DocOverlay(HashMap<String, KeywordDocEntry>);

impl DocOverlay {
    /// Reads and parses the overlay at `path`.
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::DocsRead {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| LoadError::DocsParse {
            path: path.display().to_string(),
            source,
        })
    }

    /// The entry for `ident`, if the overlay has one.
    #[must_use]
    pub fn entry(&self, ident: &str) -> Option<&KeywordDocEntry> {
        self.0.get(ident)
    }
}
