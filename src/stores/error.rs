use thiserror::Error;

use crate::gateway::GatewayError;

/// Errors surfaced by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The payload did not have the expected shape.
    #[error("Failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Text suitable for a transient message.
    pub fn user_message(&self) -> String {
        match self {
            StoreError::Gateway(err) => err.user_message(),
            StoreError::Decode { .. } => self.to_string(),
        }
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, StoreError::Gateway(GatewayError::AuthExpired))
    }
}
