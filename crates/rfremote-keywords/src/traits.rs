//! Capability and loader seams plus the per-invocation context.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::descriptor::KeywordSpec;
use crate::errors::LoadError;

/// A component exposing keyword operations to remote clients.
///
/// Implementations enumerate their operations explicitly; nothing is
/// discovered by introspection. Returned specs pass through the
/// eligibility rules at load time, so a manifest may freely declare
/// hidden, deprecated, or opaque-typed operations.
pub trait KeywordLibrary: Send + Sync {
    /// Every operation this component declares.
    fn keywords(&self) -> Vec<KeywordSpec>;
}

/// Maps a loader spec string to a component instance.
///
/// The registry is agnostic about where components come from; embedders
/// supply the mechanism. See [`crate::loader::StaticLoader`] for the
/// in-process table used by the shipped binary.
pub trait LibraryLoader: Send + Sync {
    /// Resolves `spec` to a component, or explains why it cannot.
    fn load(&self, spec: &str) -> Result<Arc<dyn KeywordLibrary>, LoadError>;
}

/// Collects diagnostic output for a single invocation.
///
/// Every run gets a fresh sink, so concurrent invocations never observe
/// each other's output. Cloning shares the same buffer.
#[derive(Debug, Clone, Default)]
pub struct OutputSink {
    buf: Arc<Mutex<String>>,
}

impl OutputSink {
    /// An empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `text` verbatim.
    pub fn write(&self, text: &str) {
        self.buf.lock().push_str(text);
    }

    /// Appends `text` followed by a newline.
    pub fn write_line(&self, text: &str) {
        let mut buf = self.buf.lock();
        buf.push_str(text);
        buf.push('\n');
    }

    /// Snapshot of everything written so far.
    #[must_use]
    pub fn contents(&self) -> String {
        self.buf.lock().clone()
    }
}

/// Per-invocation state handed to every keyword handler.
#[derive(Debug, Clone, Default)]
pub struct KeywordContext {
    /// Sink for diagnostic output; its contents travel back to the client
    /// in the result's `output` field.
    pub output: OutputSink,
}

impl KeywordContext {
    /// A context with a fresh output sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
