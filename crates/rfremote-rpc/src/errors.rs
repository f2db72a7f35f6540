//! Error codes and the endpoint fault type.

// ── Error code constants ────────────────────────────────────────────

/// Request body was not valid JSON.
pub const PARSE_ERROR: &str = "PARSE_ERROR";
/// Required parameter missing or wrong type.
pub const INVALID_PARAMS: &str = "INVALID_PARAMS";
/// Method not part of the protocol.
pub const METHOD_NOT_FOUND: &str = "METHOD_NOT_FOUND";
/// Library or keyword not loaded.
pub const NOT_FOUND: &str = "NOT_FOUND";

/// Fault that prevents producing a protocol response at all.
///
/// Protocol-level problems (unknown method, bad params, lookup misses)
/// travel inside a normal error response; this type is reserved for
/// failures of the endpoint itself and maps to a 500 at the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    /// The response could not be serialized.
    #[error("cannot serialize response: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The keyword worker task did not complete.
    #[error("keyword worker failed: {0}")]
    Worker(String),
}
