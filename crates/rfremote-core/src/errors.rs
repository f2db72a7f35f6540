//! Errors raised by keyword handlers.

use thiserror::Error;

/// Error a keyword handler fails an invocation with.
///
/// The variant decides how the failure is flagged to the remote client;
/// the message travels verbatim in the result's `error` field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeywordError {
    /// Ordinary failure.
    #[error("{0}")]
    Failure(String),

    /// Failure the client may continue past.
    #[error("{0}")]
    Continuable(String),

    /// Failure that must abort the whole remote run.
    #[error("{0}")]
    Fatal(String),
}

impl KeywordError {
    /// Ordinary failure with the given message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }

    /// Continuable failure with the given message.
    pub fn continuable(message: impl Into<String>) -> Self {
        Self::Continuable(message.into())
    }

    /// Fatal failure with the given message.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fatal(message.into())
    }
}
