//! Load and lookup errors.

use thiserror::Error;

/// Why a library load was rejected.
///
/// Loads are all-or-nothing: any error leaves the registry exactly as it
/// was before the call.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The loader spec was empty or whitespace.
    #[error("library loader spec is empty")]
    EmptySpec,

    /// The loader does not recognize the spec.
    #[error("no library registered for spec '{spec}'")]
    UnknownSpec {
        /// The unrecognized spec string.
        spec: String,
    },

    /// The loader failed while constructing the component.
    #[error("loader failed for spec '{spec}': {message}")]
    LoaderFailed {
        /// The spec being loaded.
        spec: String,
        /// What went wrong.
        message: String,
    },

    /// Two admitted keywords derived the same friendly name.
    #[error("duplicate keyword name '{name}' in library '{library}'")]
    DuplicateName {
        /// The library being loaded.
        library: String,
        /// The colliding friendly name.
        name: String,
    },

    /// A required parameter was declared after an optional one.
    #[error("keyword '{ident}': required parameter '{param}' follows an optional one")]
    TrailingRequired {
        /// Identifier of the offending keyword.
        ident: String,
        /// Name of the misplaced parameter.
        param: String,
    },

    /// A declared default does not fit its parameter's kind.
    #[error("keyword '{ident}': default for parameter '{param}' does not fit its declared kind")]
    BadDefault {
        /// Identifier of the offending keyword.
        ident: String,
        /// Name of the parameter with the bad default.
        param: String,
    },

    /// The documentation source could not be read.
    #[error("cannot read documentation source {path}: {source}")]
    DocsRead {
        /// Path of the documentation file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The documentation source is not valid JSON.
    #[error("cannot parse documentation source {path}: {source}")]
    DocsParse {
        /// Path of the documentation file.
        path: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

/// A lookup addressed a library or keyword that is not loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// No library is loaded under the given identifier.
    #[error("library '{0}' is not loaded")]
    UnknownLibrary(String),

    /// The library exists but has no keyword with the given name.
    #[error("keyword '{name}' not found in library '{library}'")]
    UnknownKeyword {
        /// The library that was searched.
        library: String,
        /// The name that was not found.
        name: String,
    },
}
