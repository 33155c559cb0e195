//! Error types for the request gateway.
//!
//! Provides the failure taxonomy callers see and the lower-level transport
//! errors it is built from.

use serde_json::Value;
use thiserror::Error;

/// Errors a gateway call can resolve with.
///
/// Rate limiting is not an error: a throttled call resolves successfully
/// with the cached payload (see [`crate::gateway::ReplyOrigin`]).
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The backend answered with an envelope carrying a non-zero `errcode`.
    #[error("{message}")]
    Api {
        code: i64,
        message: String,
        detail: Option<Value>,
    },

    /// The backend answered with a non-2xx status.
    #[error("Server responded with status {status}")]
    Server { status: u16, payload: Value },

    /// The backend rejected the session (HTTP 401).
    #[error("Session expired, please log in again")]
    AuthExpired,

    /// No response reached the client.
    #[error("Network connection lost: {0}")]
    Network(String),

    /// Anything else, passed through.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl GatewayError {
    /// Short machine-readable name for logs.
    pub fn error_type(&self) -> &'static str {
        match self {
            GatewayError::Api { .. } => "api_error",
            GatewayError::Server { .. } => "server_error",
            GatewayError::AuthExpired => "auth_expired",
            GatewayError::Network(_) => "network_error",
            GatewayError::Unexpected(_) => "unexpected_error",
        }
    }

    /// Text suitable for a transient message.
    ///
    /// Server errors prefer the message inside their payload when the
    /// backend sent one.
    pub fn user_message(&self) -> String {
        if let GatewayError::Server { payload, .. } = self {
            let from_payload = ["errdetail", "errmsg", "detail"]
                .iter()
                .filter_map(|key| payload.get(*key))
                .find_map(|v| v.as_str().filter(|s| !s.is_empty()));
            if let Some(message) = from_payload {
                return message.to_string();
            }
        }
        self.to_string()
    }
}

/// Errors produced below the gateway, by whatever moves bytes.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never got an answer (DNS, refused, reset, ...).
    #[error("No response from '{url}': {reason}")]
    NoResponse { url: String, reason: String },

    /// The request exceeded the total timeout.
    #[error("Request timeout after {duration}s")]
    Timeout { duration: u64 },

    /// The request could not be built.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Build(String),
}

impl From<TransportError> for GatewayError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::NoResponse { .. } | TransportError::Timeout { .. } => {
                GatewayError::Network(err.to_string())
            }
            TransportError::InvalidRequest(_) | TransportError::Build(_) => {
                GatewayError::Unexpected(err.to_string())
            }
        }
    }
}
