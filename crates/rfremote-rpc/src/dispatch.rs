//! Protocol method dispatch.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, error};

use rfremote_keywords::KeywordRegistry;

use crate::encoder::encode_run_result;
use crate::errors::{self, EndpointError};
use crate::types::{RpcRequest, RpcResponse};

/// Handles raw protocol bodies; the seam between transport and protocol.
#[async_trait]
pub trait RpcEndpoint: Send + Sync {
    /// Processes one request body and produces the response body.
    ///
    /// Protocol errors come back as an `Ok` error envelope; `Err` means
    /// the endpoint itself failed and maps to a 500 at the HTTP layer.
    async fn handle(&self, body: &[u8]) -> Result<Vec<u8>, EndpointError>;
}

/// The remote keyword protocol over a shared registry.
pub struct RemoteRpc {
    registry: Arc<KeywordRegistry>,
}

impl RemoteRpc {
    /// An endpoint serving `registry`.
    #[must_use]
    pub fn new(registry: Arc<KeywordRegistry>) -> Self {
        Self { registry }
    }

    async fn dispatch(&self, request: RpcRequest) -> Result<RpcResponse, EndpointError> {
        let id = request.id;
        let params = request.params.unwrap_or(Value::Null);
        let response = match request.method.as_str() {
            "get_library_names" => self.library_names(id),
            "get_keyword_names" => self.keyword_names(id, &params),
            "get_keyword_arguments" => self.keyword_arguments(id, &params),
            "get_keyword_documentation" => self.keyword_documentation(id, &params),
            "run_keyword" => return self.run_keyword(id, &params).await,
            other => {
                debug!(method = other, "unknown method");
                RpcResponse::error(
                    id,
                    errors::METHOD_NOT_FOUND,
                    format!("unknown method '{other}'"),
                )
            }
        };
        Ok(response)
    }

    fn library_names(&self, id: Option<Value>) -> RpcResponse {
        RpcResponse::success(id, json!(self.registry.library_names()))
    }

    fn keyword_names(&self, id: Option<Value>, params: &Value) -> RpcResponse {
        let library = match str_param(params, "library") {
            Ok(library) => library,
            Err(message) => return RpcResponse::error(id, errors::INVALID_PARAMS, message),
        };
        match self.registry.keyword_names(library) {
            Ok(names) => RpcResponse::success(id, json!(names)),
            Err(err) => RpcResponse::error(id, errors::NOT_FOUND, err.to_string()),
        }
    }

    fn keyword_arguments(&self, id: Option<Value>, params: &Value) -> RpcResponse {
        let (library, keyword) = match lookup_params(params) {
            Ok(pair) => pair,
            Err(message) => return RpcResponse::error(id, errors::INVALID_PARAMS, message),
        };
        match self.registry.keyword(library, keyword) {
            Ok(keyword) => RpcResponse::success(id, json!(keyword.argument_names())),
            Err(err) => RpcResponse::error(id, errors::NOT_FOUND, err.to_string()),
        }
    }

    fn keyword_documentation(&self, id: Option<Value>, params: &Value) -> RpcResponse {
        let (library, keyword) = match lookup_params(params) {
            Ok(pair) => pair,
            Err(message) => return RpcResponse::error(id, errors::INVALID_PARAMS, message),
        };
        match self.registry.keyword(library, keyword) {
            Ok(keyword) => {
                let args: serde_json::Map<String, Value> = keyword
                    .params()
                    .iter()
                    .map(|p| (p.name.clone(), json!(p.doc)))
                    .collect();
                RpcResponse::success(id, json!({ "doc": keyword.doc(), "args": args }))
            }
            Err(err) => RpcResponse::error(id, errors::NOT_FOUND, err.to_string()),
        }
    }

    async fn run_keyword(
        &self,
        id: Option<Value>,
        params: &Value,
    ) -> Result<RpcResponse, EndpointError> {
        let (library, keyword) = match lookup_params(params) {
            Ok(pair) => pair,
            Err(message) => {
                return Ok(RpcResponse::error(id, errors::INVALID_PARAMS, message));
            }
        };
        let args: Vec<rfremote_core::Value> = match params.get("args") {
            None => Vec::new(),
            Some(raw) => match serde_json::from_value(raw.clone()) {
                Ok(args) => args,
                Err(err) => {
                    return Ok(RpcResponse::error(
                        id,
                        errors::INVALID_PARAMS,
                        format!("bad args: {err}"),
                    ));
                }
            },
        };

        let registry = Arc::clone(&self.registry);
        let library = library.to_string();
        let keyword = keyword.to_string();
        let result = tokio::task::spawn_blocking(move || {
            registry.run_keyword(&library, &keyword, &args)
        })
        .await
        .map_err(|err| {
            error!(%err, "keyword worker did not complete");
            EndpointError::Worker(err.to_string())
        })?;

        Ok(RpcResponse::success(id, encode_run_result(&result)))
    }
}

#[async_trait]
impl RpcEndpoint for RemoteRpc {
    async fn handle(&self, body: &[u8]) -> Result<Vec<u8>, EndpointError> {
        let response = match serde_json::from_slice::<RpcRequest>(body) {
            Ok(request) => self.dispatch(request).await?,
            Err(err) => {
                debug!(%err, "unparseable request body");
                RpcResponse::error(None, errors::PARSE_ERROR, format!("malformed request: {err}"))
            }
        };
        Ok(serde_json::to_vec(&response)?)
    }
}

fn str_param<'a>(params: &'a Value, key: &str) -> Result<&'a str, String> {
    params
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("missing string parameter '{key}'"))
}

fn lookup_params(params: &Value) -> Result<(&str, &str), String> {
    Ok((str_param(params, "library")?, str_param(params, "keyword")?))
}

#[cfg(test)]
mod tests {
    use rfremote_core::{KeywordError, ReturnValue};
    use rfremote_keywords::{KeywordLibrary, KeywordSpec, ParamKind, ReturnKind, StaticLoader};

    use super::*;

    struct Strings;

    impl KeywordLibrary for Strings {
        fn keywords(&self) -> Vec<KeywordSpec> {
            vec![
                KeywordSpec::new("UppercaseText", |args, ctx| {
                    let text = args[0].as_str().unwrap_or_default();
                    ctx.output.write_line("uppercasing");
                    Ok(ReturnValue::Str(text.to_uppercase()))
                })
                .doc("Uppercases the given text.")
                .param("text", ParamKind::Str)
                .arg_doc("text", "the text to transform")
                .returns(ReturnKind::Str),
                KeywordSpec::new("CountUpTo", |args, _ctx| {
                    let limit = args[0].as_i64().unwrap_or_default();
                    Ok(ReturnValue::Int64(limit))
                })
                .param("limit", ParamKind::Int64)
                .returns(ReturnKind::Int64),
                KeywordSpec::new("AlwaysFatal", |_args, _ctx| {
                    Err(KeywordError::fatal("unrecoverable"))
                }),
            ]
        }
    }

    fn endpoint() -> RemoteRpc {
        let mut loader = StaticLoader::new();
        loader.register("strings", || Arc::new(Strings));
        let registry = Arc::new(KeywordRegistry::new(Arc::new(loader)));
        registry.load_library("strings", "strings", None).unwrap();
        RemoteRpc::new(registry)
    }

    async fn call(endpoint: &RemoteRpc, body: &str) -> RpcResponse {
        let bytes = endpoint.handle(body.as_bytes()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn run_keyword_round_trips() {
        let endpoint = endpoint();
        let response = call(
            &endpoint,
            r#"{"id": 3, "method": "run_keyword",
                "params": {"library": "strings", "keyword": "uppercase_text", "args": ["hi"]}}"#,
        )
        .await;
        assert!(response.success);
        assert_eq!(response.id, Some(json!(3)));
        let result = response.result.unwrap();
        assert_eq!(result["status"], "PASS");
        assert_eq!(result["return"], "HI");
        assert_eq!(result["output"], "uppercasing\n");
    }

    #[tokio::test]
    async fn run_keyword_encodes_failures_not_errors() {
        let endpoint = endpoint();
        let response = call(
            &endpoint,
            r#"{"method": "run_keyword",
                "params": {"library": "strings", "keyword": "always_fatal"}}"#,
        )
        .await;
        assert!(response.success);
        let result = response.result.unwrap();
        assert_eq!(result["status"], "FAIL");
        assert_eq!(result["error"], "unrecoverable");
        assert_eq!(result["fatal"], true);
    }

    #[tokio::test]
    async fn run_keyword_resolution_misses_are_fail_results() {
        let endpoint = endpoint();
        let response = call(
            &endpoint,
            r#"{"method": "run_keyword",
                "params": {"library": "strings", "keyword": "missing"}}"#,
        )
        .await;
        assert!(response.success);
        let result = response.result.unwrap();
        assert_eq!(result["status"], "FAIL");
        assert_eq!(
            result["error"],
            "keyword 'missing' not found in library 'strings'"
        );
    }

    #[tokio::test]
    async fn wide_integer_arguments_reach_the_handler() {
        let endpoint = endpoint();
        let response = call(
            &endpoint,
            r#"{"method": "run_keyword",
                "params": {"library": "strings", "keyword": "count_up_to", "args": [5000000000]}}"#,
        )
        .await;
        let result = response.result.unwrap();
        assert_eq!(result["return"], "5000000000");
    }

    #[tokio::test]
    async fn library_names_lists_loaded_libraries() {
        let endpoint = endpoint();
        let response = call(&endpoint, r#"{"method": "get_library_names"}"#).await;
        assert_eq!(response.result.unwrap(), json!(["strings"]));
    }

    #[tokio::test]
    async fn keyword_names_preserve_declaration_order() {
        let endpoint = endpoint();
        let response = call(
            &endpoint,
            r#"{"method": "get_keyword_names", "params": {"library": "strings"}}"#,
        )
        .await;
        assert_eq!(
            response.result.unwrap(),
            json!(["uppercase_text", "count_up_to", "always_fatal"])
        );
    }

    #[tokio::test]
    async fn keyword_arguments_lists_names_in_order() {
        let endpoint = endpoint();
        let response = call(
            &endpoint,
            r#"{"method": "get_keyword_arguments",
                "params": {"library": "strings", "keyword": "uppercase_text"}}"#,
        )
        .await;
        assert_eq!(response.result.unwrap(), json!(["text"]));
    }

    #[tokio::test]
    async fn keyword_documentation_includes_arg_docs() {
        let endpoint = endpoint();
        let response = call(
            &endpoint,
            r#"{"method": "get_keyword_documentation",
                "params": {"library": "strings", "keyword": "UPPERCASE_TEXT"}}"#,
        )
        .await;
        let result = response.result.unwrap();
        assert_eq!(result["doc"], "Uppercases the given text.");
        assert_eq!(result["args"]["text"], "the text to transform");
    }

    #[tokio::test]
    async fn unknown_method_is_a_protocol_error() {
        let endpoint = endpoint();
        let response = call(&endpoint, r#"{"id": 9, "method": "discover_everything"}"#).await;
        assert!(!response.success);
        assert_eq!(response.id, Some(json!(9)));
        let error = response.error.unwrap();
        assert_eq!(error.code, errors::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_library_is_not_found() {
        let endpoint = endpoint();
        let response = call(
            &endpoint,
            r#"{"method": "get_keyword_names", "params": {"library": "ghost"}}"#,
        )
        .await;
        assert_eq!(response.error.unwrap().code, errors::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_params_are_invalid() {
        let endpoint = endpoint();
        let response = call(&endpoint, r#"{"method": "get_keyword_names"}"#).await;
        let error = response.error.unwrap();
        assert_eq!(error.code, errors::INVALID_PARAMS);
        assert_eq!(error.message, "missing string parameter 'library'");
    }

    #[tokio::test]
    async fn bad_args_are_invalid_params() {
        let endpoint = endpoint();
        let response = call(
            &endpoint,
            r#"{"method": "run_keyword",
                "params": {"library": "strings", "keyword": "uppercase_text", "args": {"not": "a list"}}}"#,
        )
        .await;
        assert_eq!(response.error.unwrap().code, errors::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn malformed_bodies_are_parse_errors() {
        let endpoint = endpoint();
        let response = call(&endpoint, "{ this is not json").await;
        assert!(!response.success);
        assert_eq!(response.id, None);
        assert_eq!(response.error.unwrap().code, errors::PARSE_ERROR);
    }

    #[tokio::test]
    async fn null_arguments_pass_through_to_coercion() {
        let endpoint = endpoint();
        let response = call(
            &endpoint,
            r#"{"method": "run_keyword",
                "params": {"library": "strings", "keyword": "uppercase_text", "args": [null]}}"#,
        )
        .await;
        let result = response.result.unwrap();
        assert_eq!(result["status"], "FAIL");
        assert_eq!(
            result["error"],
            "argument 'text': cannot convert null to string"
        );
    }
}
