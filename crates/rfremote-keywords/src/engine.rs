//! Invocation pipeline: arity, coercion, execution, output capture.

use std::time::Instant;

use tracing::debug;

use rfremote_core::{RunResult, Value};

use crate::coerce;
use crate::descriptor::Keyword;
use crate::traits::KeywordContext;

/// Runs `keyword` with `args`, producing a result for every outcome.
///
/// Duration covers the handler call only; arity and coercion failures
/// report zero seconds and empty output.
pub(crate) fn execute(keyword: &Keyword, args: &[Value]) -> RunResult {
    let required = keyword.required_args();
    let total = keyword.total_args();
    if args.len() < required || args.len() > total {
        return RunResult::fail(format!(
            "wrong number of arguments for '{}': expected {required}..{total}, got {}",
            keyword.name(),
            args.len()
        ));
    }

    let bound = match bind_args(keyword, args) {
        Ok(bound) => bound,
        Err(message) => return RunResult::fail(message),
    };

    let ctx = KeywordContext::new();
    let started = Instant::now();
    let outcome = (keyword.handler())(&bound, &ctx);
    let duration_secs = started.elapsed().as_secs_f64();

    let mut result = match outcome {
        Ok(value) => RunResult::pass(value),
        Err(err) => RunResult::from_error(&err),
    };
    result.output = ctx.output.contents();
    result.duration_secs = duration_secs;
    debug!(
        keyword = keyword.name(),
        status = result.status.as_str(),
        duration_secs,
        "keyword finished"
    );
    result
}

/// Binds supplied arguments to parameters, coercing each to its declared
/// kind and substituting defaults for missing or null optionals.
fn bind_args(keyword: &Keyword, args: &[Value]) -> Result<Vec<Value>, String> {
    let mut bound = Vec::with_capacity(keyword.total_args());
    for (i, param) in keyword.params().iter().enumerate() {
        let supplied = args.get(i);
        let value = match supplied {
            None | Some(Value::Null) => match (&param.default, supplied) {
                (Some(default), _) => default.clone(),
                (None, Some(null)) => {
                    return Err(format!(
                        "argument '{}': cannot convert {} to {}",
                        param.name,
                        null.type_name(),
                        param.kind.name()
                    ));
                }
                (None, None) => {
                    return Err(format!("argument '{}' is required", param.name));
                }
            },
            Some(value) => coerce::coerce(value, &param.kind).map_err(|err| {
                format!(
                    "argument '{}': cannot convert {} to {}",
                    param.name, err.supplied, err.target
                )
            })?,
        };
        bound.push(value);
    }
    Ok(bound)
}
