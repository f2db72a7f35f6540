//! File and flag configuration for the server binary.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rfremote_server::ServerConfig;
use serde::Deserialize;

/// One library to load at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LibraryEntry {
    /// Name the library is exposed under.
    pub name: String,
    /// Component spec the loader resolves.
    pub spec: String,
    /// Optional documentation overlay file.
    #[serde(default)]
    pub docs: Option<PathBuf>,
}

/// Everything the binary needs to run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Listener configuration.
    pub server: ServerConfig,
    /// Libraries to load at startup.
    pub libraries: Vec<LibraryEntry>,
}

impl Settings {
    /// Reads settings from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// Overrides the bind address with whichever values are present.
    pub fn apply_overrides(&mut self, host: Option<String>, port: Option<u16>) {
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
    }
}

/// Parses a `name=spec[,docs=path]` library flag.
pub fn parse_library_flag(raw: &str) -> Result<LibraryEntry> {
    let (head, docs) = match raw.split_once(",docs=") {
        Some((head, docs)) => (head, Some(PathBuf::from(docs))),
        None => (raw, None),
    };
    let Some((name, spec)) = head.split_once('=') else {
        bail!("library flag '{raw}' is not name=spec[,docs=path]");
    };
    if name.is_empty() || spec.is_empty() {
        bail!("library flag '{raw}' is not name=spec[,docs=path]");
    }
    Ok(LibraryEntry {
        name: name.to_string(),
        spec: spec.to_string(),
        docs,
    })
}
