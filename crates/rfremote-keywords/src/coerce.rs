//! Argument coercion from wire values to declared parameter kinds.

use rfremote_core::Value;

use crate::descriptor::ParamKind;

/// Strings that coerce to `true`; every other string coerces to `false`.
const TRUE_STRINGS: [&str; 3] = ["true", "on", "1"];

/// A supplied value that cannot convert to its declared kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoerceError {
    /// Wire type of the supplied value.
    pub supplied: &'static str,
    /// Name of the declared target kind.
    pub target: String,
}

/// Converts `value` to the declared `kind`.
///
/// Enum coercion resolves to the canonical member name as a string. Null
/// never coerces; callers substitute defaults before getting here.
pub fn coerce(value: &Value, kind: &ParamKind) -> Result<Value, CoerceError> {
    match kind {
        ParamKind::Str => to_str(value),
        ParamKind::Bool => to_bool(value),
        ParamKind::Int32 => to_i32(value),
        ParamKind::Int64 => to_i64(value),
        ParamKind::Double => to_f64(value),
        ParamKind::Enum(members) => to_enum(value, members),
        ParamKind::Opaque(_) => Err(mismatch(value, kind)),
    }
}

fn mismatch(value: &Value, kind: &ParamKind) -> CoerceError {
    CoerceError {
        supplied: value.type_name(),
        target: kind.name().to_string(),
    }
}

fn to_str(value: &Value) -> Result<Value, CoerceError> {
    match value {
        Value::Str(_) => Ok(value.clone()),
        Value::Bool(_) | Value::Int32(_) | Value::Int64(_) | Value::Double(_) => {
            Ok(Value::Str(value.to_string()))
        }
        Value::Null => Err(mismatch(value, &ParamKind::Str)),
    }
}

fn to_bool(value: &Value) -> Result<Value, CoerceError> {
    match value {
        Value::Bool(_) => Ok(value.clone()),
        Value::Str(s) => Ok(Value::Bool(
            TRUE_STRINGS.iter().any(|t| s.eq_ignore_ascii_case(t)),
        )),
        Value::Int32(v) => Ok(Value::Bool(*v != 0)),
        Value::Int64(v) => Ok(Value::Bool(*v != 0)),
        Value::Double(_) | Value::Null => Err(mismatch(value, &ParamKind::Bool)),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn to_i32(value: &Value) -> Result<Value, CoerceError> {
    let fail = || mismatch(value, &ParamKind::Int32);
    match value {
        Value::Int32(_) => Ok(value.clone()),
        Value::Str(s) => s
            .trim()
            .parse::<i32>()
            .map(Value::Int32)
            .map_err(|_| fail()),
        Value::Int64(v) => i32::try_from(*v).map(Value::Int32).map_err(|_| fail()),
        Value::Double(v) => {
            let rounded = v.round();
            if rounded >= f64::from(i32::MIN) && rounded <= f64::from(i32::MAX) {
                Ok(Value::Int32(rounded as i32))
            } else {
                Err(fail())
            }
        }
        Value::Bool(_) | Value::Null => Err(fail()),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn to_i64(value: &Value) -> Result<Value, CoerceError> {
    let fail = || mismatch(value, &ParamKind::Int64);
    match value {
        Value::Int64(_) => Ok(value.clone()),
        Value::Int32(v) => Ok(Value::Int64(i64::from(*v))),
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Int64)
            .map_err(|_| fail()),
        Value::Double(v) => {
            // 2^63 is exactly representable; the valid doubles are [-2^63, 2^63).
            const LIMIT: f64 = 9_223_372_036_854_775_808.0;
            let rounded = v.round();
            if rounded >= -LIMIT && rounded < LIMIT {
                Ok(Value::Int64(rounded as i64))
            } else {
                Err(fail())
            }
        }
        Value::Bool(_) | Value::Null => Err(fail()),
    }
}

#[allow(clippy::cast_precision_loss)]
fn to_f64(value: &Value) -> Result<Value, CoerceError> {
    let fail = || mismatch(value, &ParamKind::Double);
    match value {
        Value::Double(_) => Ok(value.clone()),
        Value::Int32(v) => Ok(Value::Double(f64::from(*v))),
        Value::Int64(v) => Ok(Value::Double(*v as f64)),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Double)
            .map_err(|_| fail()),
        Value::Bool(_) | Value::Null => Err(fail()),
    }
}

fn to_enum(value: &Value, members: &[String]) -> Result<Value, CoerceError> {
    let fail = || CoerceError {
        supplied: value.type_name(),
        target: "enum".to_string(),
    };
    let by_index = |index: i64| {
        usize::try_from(index)
            .ok()
            .and_then(|i| members.get(i))
            .map(|m| Value::Str(m.clone()))
            .ok_or_else(fail)
    };
    match value {
        Value::Str(s) => members
            .iter()
            .find(|m| m.eq_ignore_ascii_case(s))
            .map(|m| Value::Str(m.clone()))
            .ok_or_else(fail),
        Value::Int32(v) => by_index(i64::from(*v)),
        Value::Int64(v) => by_index(*v),
        Value::Bool(_) | Value::Double(_) | Value::Null => Err(fail()),
    }
}
