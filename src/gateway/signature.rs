//! Request signature computation for duplicate suppression.
//!
//! A signature identifies a class of requests by method, path, query
//! parameters and body. Requests with the same signature inside the
//! throttle window are considered duplicates.

use std::fmt;

use reqwest::Method;
use serde_json::Value;

/// Identity key for throttling and response caching.
///
/// The empty signature is never throttled and never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RequestSignature(String);

impl RequestSignature {
    /// Compute the signature of a request.
    ///
    /// Paths ending in `/get` or `/query` are reads that must always reach
    /// the backend; they collapse to the empty signature.
    pub fn compute(
        method: &Method,
        path: &str,
        params: Option<&Value>,
        body: Option<&Value>,
    ) -> Self {
        if bypasses_throttle(path) {
            return Self::default();
        }

        RequestSignature(format!(
            "{}-{}-{}-{}",
            method.as_str().to_ascii_lowercase(),
            path,
            serialize_part(params),
            serialize_part(body)
        ))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn bypasses_throttle(path: &str) -> bool {
    path.ends_with("/get") || path.ends_with("/query")
}

// Strings are taken verbatim, everything else as compact JSON.
fn serialize_part(part: Option<&Value>) -> String {
    match part {
        None | Some(Value::Null) => "{}".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
