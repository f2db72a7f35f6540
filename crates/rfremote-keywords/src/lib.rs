//! # rfremote-keywords
//!
//! Keyword libraries and the registry that serves them:
//! - **Capability trait**: components declare their operations explicitly
//! - **Descriptors**: parameter and return kinds, friendly names, handlers
//! - **Registry**: load, look up, list, and run keywords by library
//! - **Engine**: arity checks, argument coercion, output capture, timing
//!
//! Loading is all-or-nothing and never races serving; running never
//! raises, every outcome is a `RunResult`.

#![deny(unsafe_code)]

pub mod coerce;
pub mod descriptor;
pub mod docs;
mod engine;
pub mod errors;
pub mod loader;
pub mod registry;
pub mod traits;

pub use descriptor::{Keyword, KeywordFn, KeywordSpec, ParamKind, ParamSpec, ReturnKind};
pub use errors::{LoadError, LookupError};
pub use loader::StaticLoader;
pub use registry::KeywordRegistry;
pub use traits::{KeywordContext, KeywordLibrary, LibraryLoader, OutputSink};
