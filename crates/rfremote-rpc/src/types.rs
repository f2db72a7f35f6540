//! Request and response envelope types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single protocol request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Client-chosen correlation id, echoed back verbatim.
    #[serde(default)]
    pub id: Option<Value>,
    /// Method name, e.g. `run_keyword`.
    pub method: String,
    /// Method parameters.
    #[serde(default)]
    pub params: Option<Value>,
}

/// Response to a protocol request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    /// Correlation id from the request; null when the request could not be
    /// parsed.
    pub id: Option<Value>,
    /// Whether the request succeeded.
    pub success: bool,
    /// Result payload, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error details, present on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorBody>,
}

/// Error payload of a failed response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcErrorBody {
    /// Machine-readable code, e.g. `METHOD_NOT_FOUND`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl RpcResponse {
    /// A successful response carrying `result`.
    #[must_use]
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            id,
            success: true,
            result: Some(result),
            error: None,
        }
    }

    /// A failed response with `code` and `message`.
    #[must_use]
    pub fn error(id: Option<Value>, code: &str, message: impl Into<String>) -> Self {
        Self {
            id,
            success: false,
            result: None,
            error: Some(RpcErrorBody {
                code: code.to_string(),
                message: message.into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn requests_parse_with_and_without_id() {
        let with: RpcRequest =
            serde_json::from_str(r#"{"id": 7, "method": "run_keyword", "params": {}}"#).unwrap();
        assert_eq!(with.id, Some(json!(7)));
        assert_eq!(with.method, "run_keyword");

        let without: RpcRequest = serde_json::from_str(r#"{"method": "get_library_names"}"#).unwrap();
        assert_eq!(without.id, None);
        assert_eq!(without.params, None);
    }

    #[test]
    fn success_omits_the_error_field() {
        let response = RpcResponse::success(Some(json!(1)), json!(["a"]));
        let text = serde_json::to_string(&response).unwrap();
        assert!(text.contains("\"success\":true"));
        assert!(!text.contains("\"error\""));
    }

    #[test]
    fn error_omits_the_result_field() {
        let response = RpcResponse::error(None, "METHOD_NOT_FOUND", "unknown method 'x'");
        let text = serde_json::to_string(&response).unwrap();
        assert!(text.contains("\"id\":null"));
        assert!(text.contains("\"code\":\"METHOD_NOT_FOUND\""));
        assert!(!text.contains("\"result\""));
    }
}
