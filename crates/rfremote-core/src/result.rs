//! Run results and failure classification.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::KeywordError;

/// Outcome status of a keyword run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    /// The keyword completed normally.
    Pass,
    /// The keyword failed or could not be invoked.
    Fail,
}

impl RunStatus {
    /// The wire form, `PASS` or `FAIL`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Pass => "PASS",
            RunStatus::Fail => "FAIL",
        }
    }
}

/// How a failed run should be treated by the client.
///
/// Derived from the handler's error variant, never from message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureKind {
    /// No failure: the run passed.
    #[default]
    None,
    /// The client may continue with the rest of its run.
    Continuable,
    /// The client must abort the whole run.
    Fatal,
    /// An ordinary failure.
    Plain,
}

impl From<&KeywordError> for FailureKind {
    fn from(err: &KeywordError) -> Self {
        match err {
            KeywordError::Failure(_) => FailureKind::Plain,
            KeywordError::Continuable(_) => FailureKind::Continuable,
            KeywordError::Fatal(_) => FailureKind::Fatal,
        }
    }
}

/// Value produced by a keyword handler.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ReturnValue {
    /// No return value.
    #[default]
    Void,
    /// UTF-8 string.
    Str(String),
    /// Boolean.
    Bool(bool),
    /// 32-bit signed integer.
    Int32(i32),
    /// 64-bit signed integer.
    Int64(i64),
    /// Double-precision float.
    Double(f64),
    /// List of strings.
    StrList(Vec<String>),
    /// Map of string keys to 32-bit integers.
    IntMap(BTreeMap<String, i32>),
}

/// Complete outcome of one keyword invocation.
///
/// Every invocation produces exactly one of these; the run entry point
/// never raises.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    /// PASS or FAIL.
    pub status: RunStatus,
    /// Failure message, empty on PASS.
    pub error: String,
    /// Diagnostics captured from the invocation's output sink.
    pub output: String,
    /// Handler return value, `Void` when none was produced.
    pub return_value: ReturnValue,
    /// Classification of the failure, `None` on PASS.
    pub failure_kind: FailureKind,
    /// Wall-clock seconds spent inside the handler.
    pub duration_secs: f64,
}

impl RunResult {
    /// A passing result carrying `return_value`.
    #[must_use]
    pub fn pass(return_value: ReturnValue) -> Self {
        Self {
            status: RunStatus::Pass,
            error: String::new(),
            output: String::new(),
            return_value,
            failure_kind: FailureKind::None,
            duration_secs: 0.0,
        }
    }

    /// An ordinary failure with `error` as the message.
    #[must_use]
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            status: RunStatus::Fail,
            error: error.into(),
            output: String::new(),
            return_value: ReturnValue::Void,
            failure_kind: FailureKind::Plain,
            duration_secs: 0.0,
        }
    }

    /// A failure classified from the handler error that produced it.
    #[must_use]
    pub fn from_error(err: &KeywordError) -> Self {
        let mut result = Self::fail(err.to_string());
        result.failure_kind = FailureKind::from(err);
        result
    }

    /// Whether the run passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == RunStatus::Pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_forms() {
        assert_eq!(RunStatus::Pass.as_str(), "PASS");
        assert_eq!(RunStatus::Fail.as_str(), "FAIL");
        assert_eq!(serde_json::to_string(&RunStatus::Pass).unwrap(), "\"PASS\"");
    }

    #[test]
    fn pass_has_no_error_and_no_kind() {
        let result = RunResult::pass(ReturnValue::Int32(5));
        assert!(result.passed());
        assert_eq!(result.error, "");
        assert_eq!(result.failure_kind, FailureKind::None);
        assert_eq!(result.return_value, ReturnValue::Int32(5));
    }

    #[test]
    fn fail_is_plain_by_default() {
        let result = RunResult::fail("nope");
        assert!(!result.passed());
        assert_eq!(result.failure_kind, FailureKind::Plain);
        assert_eq!(result.return_value, ReturnValue::Void);
    }

    #[test]
    fn classification_follows_error_variant() {
        let cont = RunResult::from_error(&KeywordError::continuable("c"));
        let fatal = RunResult::from_error(&KeywordError::fatal("f"));
        let plain = RunResult::from_error(&KeywordError::failure("p"));
        assert_eq!(cont.failure_kind, FailureKind::Continuable);
        assert_eq!(fatal.failure_kind, FailureKind::Fatal);
        assert_eq!(plain.failure_kind, FailureKind::Plain);
        assert_eq!(cont.error, "c");
    }
}
