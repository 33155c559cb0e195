use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Per-call options understood by the gateway.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Query parameters (sent on the URL).
    pub params: Option<Value>,
    /// JSON body.
    pub body: Option<Value>,
    /// Send even if an identical request went out inside the window.
    pub ignore_rate_limit: bool,
}

impl RequestOptions {
    pub fn with_params(params: Value) -> Self {
        Self {
            params: Some(params),
            ..Self::default()
        }
    }

    pub fn with_body(body: Value) -> Self {
        Self {
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn ignoring_rate_limit(mut self) -> Self {
        self.ignore_rate_limit = true;
        self
    }

    /// Layer `overrides` on top of `self`.
    ///
    /// Fields the override sets win; opting out of the rate limit on
    /// either side sticks.
    pub fn merge(self, overrides: RequestOptions) -> Self {
        Self {
            params: overrides.params.or(self.params),
            body: overrides.body.or(self.body),
            ignore_rate_limit: self.ignore_rate_limit || overrides.ignore_rate_limit,
        }
    }
}

impl From<()> for RequestOptions {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

impl From<Value> for RequestOptions {
    fn from(body: Value) -> Self {
        Self::with_body(body)
    }
}

/// A fully resolved outgoing request, as handed to a transport.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub request_id: String,
    pub method: Method,
    pub path: String,
    pub params: Option<Value>,
    pub body: Option<Value>,
}

/// What the transport got back before envelope handling.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    /// Parsed JSON body; `Null` when empty.
    pub body: Value,
}

impl TransportResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Where a reply's payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOrigin {
    /// Fresh from the backend.
    Network,
    /// Rate limited; payload is the last one seen for this request.
    Cache,
    /// Rate limited with nothing cached yet; payload is an empty object.
    Throttled,
}

/// Successful gateway result.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub payload: Value,
    pub origin: ReplyOrigin,
}

impl Reply {
    pub fn network(payload: Value) -> Self {
        Self {
            payload,
            origin: ReplyOrigin::Network,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.origin != ReplyOrigin::Network
    }

    /// True when the call was suppressed and there was nothing to answer with.
    pub fn is_empty_throttle(&self) -> bool {
        self.origin == ReplyOrigin::Throttled
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.payload)
    }
}
