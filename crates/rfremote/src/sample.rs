//! Built-in sample library.
//!
//! Small demonstration keywords exercising every parameter and return
//! kind the protocol carries. Loaded by default when no libraries are
//! configured, so a fresh install has something to point a client at.

use std::collections::BTreeMap;

use rfremote_core::{KeywordError, ReturnValue, Value};
use rfremote_keywords::{KeywordLibrary, KeywordSpec, ParamKind, ReturnKind};

/// Spec name the sample library is registered under.
pub const SPEC: &str = "sample";

/// The demonstration component.
pub struct SampleLibrary;

impl KeywordLibrary for SampleLibrary {
    fn keywords(&self) -> Vec<KeywordSpec> {
        vec![
            add_two_numbers(),
            multiply_to_long(),
            absolute_value(),
            divide_numbers(),
            toggle_flag(),
            is_positive(),
            greet_user(),
            repeat_text(),
            split_csv(),
            count_words(),
            set_log_level(),
            log_message(),
            raise_continuable_error(),
            raise_fatal_error(),
            fail_with_message(),
            reset_internal_state(),
            old_add_numbers(),
            attach_stream(),
        ]
    }
}

fn add_two_numbers() -> KeywordSpec {
    KeywordSpec::new("AddTwoNumbers", |args, _ctx| {
        let a = args.first().and_then(Value::as_i32).unwrap_or_default();
        let b = args.get(1).and_then(Value::as_i32).unwrap_or_default();
        a.checked_add(b)
            .map(ReturnValue::Int32)
            .ok_or_else(|| KeywordError::failure("sum is out of range for int32"))
    })
    .doc("Adds two 32-bit integers.")
    .param("a", ParamKind::Int32)
    .arg_doc("a", "first addend")
    .param("b", ParamKind::Int32)
    .arg_doc("b", "second addend")
    .returns(ReturnKind::Int32)
}

fn multiply_to_long() -> KeywordSpec {
    KeywordSpec::new("MultiplyToLong", |args, _ctx| {
        let a = args.first().and_then(Value::as_i64).unwrap_or_default();
        let b = args.get(1).and_then(Value::as_i64).unwrap_or_default();
        Ok(ReturnValue::Int64(a * b))
    })
    .doc("Multiplies two 32-bit integers into a 64-bit product.")
    .param("a", ParamKind::Int32)
    .param("b", ParamKind::Int32)
    .returns(ReturnKind::Int64)
}

fn absolute_value() -> KeywordSpec {
    KeywordSpec::new("AbsoluteValue", |args, _ctx| {
        let value = args.first().and_then(Value::as_i64).unwrap_or_default();
        value
            .checked_abs()
            .map(ReturnValue::Int64)
            .ok_or_else(|| KeywordError::failure("value is out of range for int64"))
    })
    .doc("The absolute value of a 64-bit integer.")
    .param("value", ParamKind::Int64)
    .returns(ReturnKind::Int64)
}

fn divide_numbers() -> KeywordSpec {
    KeywordSpec::new("DivideNumbers", |args, _ctx| {
        let numerator = args.first().and_then(Value::as_f64).unwrap_or_default();
        let denominator = args.get(1).and_then(Value::as_f64).unwrap_or_default();
        if denominator == 0.0 {
            return Err(KeywordError::failure("cannot divide by zero"));
        }
        Ok(ReturnValue::Double(numerator / denominator))
    })
    .doc("Divides two doubles.")
    .param("numerator", ParamKind::Double)
    .param("denominator", ParamKind::Double)
    .returns(ReturnKind::Double)
}

fn toggle_flag() -> KeywordSpec {
    KeywordSpec::new("ToggleFlag", |args, _ctx| {
        let value = args.first().and_then(Value::as_bool).unwrap_or_default();
        Ok(ReturnValue::Bool(!value))
    })
    .doc("Negates a boolean.")
    .param("value", ParamKind::Bool)
    .returns(ReturnKind::Bool)
}

fn is_positive() -> KeywordSpec {
    KeywordSpec::new("IsPositive", |args, _ctx| {
        let value = args.first().and_then(Value::as_f64).unwrap_or_default();
        Ok(ReturnValue::Bool(value > 0.0))
    })
    .doc("Whether a double is strictly positive.")
    .param("value", ParamKind::Double)
    .returns(ReturnKind::Bool)
}

fn greet_user() -> KeywordSpec {
    KeywordSpec::new("GreetUser", |args, ctx| {
        let name = args.first().and_then(Value::as_str).unwrap_or_default();
        let greeting = args.get(1).and_then(Value::as_str).unwrap_or_default();
        ctx.output.write_line(&format!("greeting {name}"));
        Ok(ReturnValue::Str(format!("{greeting}, {name}!")))
    })
    .doc("Builds a greeting for the given name.")
    .param("name", ParamKind::Str)
    .arg_doc("name", "who to greet")
    .optional_param("greeting", ParamKind::Str, Value::Str("Hello".into()))
    .arg_doc("greeting", "salutation to lead with")
    .returns(ReturnKind::Str)
}

fn repeat_text() -> KeywordSpec {
    KeywordSpec::new("RepeatText", |args, _ctx| {
        let text = args.first().and_then(Value::as_str).unwrap_or_default();
        let times = args.get(1).and_then(Value::as_i32).unwrap_or_default();
        let times = usize::try_from(times)
            .map_err(|_| KeywordError::failure("times must not be negative"))?;
        Ok(ReturnValue::Str(text.repeat(times)))
    })
    .doc("Repeats the text the given number of times.")
    .param("text", ParamKind::Str)
    .optional_param("times", ParamKind::Int32, Value::Int32(2))
    .returns(ReturnKind::Str)
}

fn split_csv() -> KeywordSpec {
    KeywordSpec::new("SplitCsv", |args, _ctx| {
        let line = args.first().and_then(Value::as_str).unwrap_or_default();
        let fields = line.split(',').map(|f| f.trim().to_string()).collect();
        Ok(ReturnValue::StrList(fields))
    })
    .doc("Splits a comma-separated line into trimmed fields.")
    .param("line", ParamKind::Str)
    .returns(ReturnKind::StrList)
}

fn count_words() -> KeywordSpec {
    KeywordSpec::new("CountWords", |args, _ctx| {
        let text = args.first().and_then(Value::as_str).unwrap_or_default();
        let mut counts = BTreeMap::new();
        for word in text.split_whitespace() {
            *counts.entry(word.to_lowercase()).or_insert(0_i32) += 1;
        }
        Ok(ReturnValue::IntMap(counts))
    })
    .doc("Counts occurrences of each whitespace-separated word.")
    .param("text", ParamKind::Str)
    .returns(ReturnKind::IntMap)
}

fn set_log_level() -> KeywordSpec {
    let members = vec![
        "Debug".to_string(),
        "Info".to_string(),
        "Warning".to_string(),
        "Error".to_string(),
    ];
    KeywordSpec::new("SetLogLevel", |args, ctx| {
        let level = args.first().and_then(Value::as_str).unwrap_or_default();
        ctx.output.write_line(&format!("log level set to {level}"));
        Ok(ReturnValue::Str(level.to_string()))
    })
    .doc("Sets the pretend log level and echoes the canonical member.")
    .param("level", ParamKind::Enum(members))
    .returns(ReturnKind::Str)
}

fn log_message() -> KeywordSpec {
    KeywordSpec::new("LogMessage", |args, ctx| {
        let message = args.first().and_then(Value::as_str).unwrap_or_default();
        ctx.output.write_line(message);
        Ok(ReturnValue::Void)
    })
    .doc("Writes a message to the run output.")
    .param("message", ParamKind::Str)
}

fn raise_continuable_error() -> KeywordSpec {
    KeywordSpec::new("RaiseContinuableError", |args, _ctx| {
        let message = args.first().and_then(Value::as_str).unwrap_or_default();
        Err(KeywordError::continuable(message))
    })
    .doc("Fails in a way the caller may continue past.")
    .optional_param("message", ParamKind::Str, Value::Str("soft failure".into()))
}

fn raise_fatal_error() -> KeywordSpec {
    KeywordSpec::new("RaiseFatalError", |args, _ctx| {
        let message = args.first().and_then(Value::as_str).unwrap_or_default();
        Err(KeywordError::fatal(message))
    })
    .doc("Fails in a way that should end the whole run.")
    .optional_param("message", ParamKind::Str, Value::Str("hard failure".into()))
}

fn fail_with_message() -> KeywordSpec {
    KeywordSpec::new("FailWithMessage", |args, _ctx| {
        let message = args.first().and_then(Value::as_str).unwrap_or_default();
        Err(KeywordError::failure(message))
    })
    .doc("Fails with exactly the given message.")
    .param("message", ParamKind::Str)
}

// Local-only maintenance hook; not exposed remotely.
fn reset_internal_state() -> KeywordSpec {
    KeywordSpec::new("ResetInternalState", |_args, _ctx| Ok(ReturnValue::Void)).hidden()
}

fn old_add_numbers() -> KeywordSpec {
    KeywordSpec::new("OldAddNumbers", |args, _ctx| {
        let a = args.first().and_then(Value::as_i32).unwrap_or_default();
        let b = args.get(1).and_then(Value::as_i32).unwrap_or_default();
        Ok(ReturnValue::Int32(a.wrapping_add(b)))
    })
    .doc("Superseded by AddTwoNumbers.")
    .param("a", ParamKind::Int32)
    .param("b", ParamKind::Int32)
    .returns(ReturnKind::Int32)
    .deprecated()
}

fn attach_stream() -> KeywordSpec {
    KeywordSpec::new("AttachStream", |_args, _ctx| Ok(ReturnValue::Void))
        .doc("Takes a host-side stream; unreachable over the wire.")
        .param("stream", ParamKind::Opaque("TcpStream".into()))
}
