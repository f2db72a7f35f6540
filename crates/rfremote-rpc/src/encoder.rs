//! Encoding of run results into the wire structure.

use serde_json::{json, Map, Value};

use rfremote_core::{FailureKind, ReturnValue, RunResult};

/// Encodes `result` as the protocol's result structure.
///
/// `status`, `error`, `traceback`, `output`, and `return` are always
/// present; `traceback` is always empty. A failed run additionally
/// carries `continuable: true` or `fatal: true` when classified that way,
/// never both.
#[must_use]
pub fn encode_run_result(result: &RunResult) -> Value {
    let mut map = Map::new();
    let _ = map.insert("status".to_string(), json!(result.status.as_str()));
    let _ = map.insert("error".to_string(), json!(result.error));
    let _ = map.insert("traceback".to_string(), json!(""));
    let _ = map.insert("output".to_string(), json!(result.output));
    let _ = map.insert("return".to_string(), encode_return(&result.return_value));
    match result.failure_kind {
        FailureKind::Continuable => {
            let _ = map.insert("continuable".to_string(), json!(true));
        }
        FailureKind::Fatal => {
            let _ = map.insert("fatal".to_string(), json!(true));
        }
        FailureKind::None | FailureKind::Plain => {}
    }
    Value::Object(map)
}

/// Return values in their wire forms: 64-bit integers as decimal strings,
/// maps as nested objects, absent values as the empty string.
fn encode_return(value: &ReturnValue) -> Value {
    match value {
        ReturnValue::Void => json!(""),
        ReturnValue::Str(s) => json!(s),
        ReturnValue::Bool(b) => json!(b),
        ReturnValue::Int32(v) => json!(v),
        ReturnValue::Int64(v) => json!(v.to_string()),
        ReturnValue::Double(v) => json!(v),
        ReturnValue::StrList(items) => json!(items),
        ReturnValue::IntMap(map) => json!(map),
    }
}
