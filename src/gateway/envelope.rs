//! Backend response envelope.
//!
//! Success looks like `{"errcode": 0, "ret": <payload>}`, failure like
//! `{"errcode": 10001, "errmsg": "...", "errdetail": ...}`.

use serde_json::{Map, Value};

use crate::gateway::error::GatewayError;

const FALLBACK_MESSAGE: &str = "Server error";

/// Extract the payload from an envelope, or the error it carries.
///
/// A missing or null `ret` yields an empty object, as does a body that is
/// not an object at all.
pub fn unwrap_envelope(body: Value) -> Result<Value, GatewayError> {
    let Value::Object(mut envelope) = body else {
        return Ok(empty_payload());
    };

    if let Some(code) = envelope.get("errcode").filter(|c| is_truthy(c)) {
        let code = code
            .as_i64()
            .or_else(|| code.as_str().and_then(|s| s.parse().ok()))
            .unwrap_or(-1);
        let detail = envelope.remove("errdetail").filter(|d| !d.is_null());
        let message = detail
            .as_ref()
            .and_then(describe)
            .or_else(|| envelope.get("errmsg").and_then(describe))
            .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());
        return Err(GatewayError::Api {
            code,
            message,
            detail,
        });
    }

    match envelope.remove("ret") {
        Some(Value::Null) | None => Ok(empty_payload()),
        Some(payload) => Ok(payload),
    }
}

pub fn empty_payload() -> Value {
    Value::Object(Map::new())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn describe(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
