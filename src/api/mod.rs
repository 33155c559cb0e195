//! Remote operations, one module per resource family.
//!
//! Each function binds a verb and path through [`crate::gateway::Resource`]; none of them
//! interpret the payload.

pub mod card;
pub mod category;
pub mod home;
pub mod record;
pub mod user;

use serde::Serialize;
use serde_json::Value;

use crate::gateway::GatewayError;

pub use card::CardApi;
pub use category::{CategoryApi, CategoryKind};
pub use home::HomeApi;
pub use record::RecordApi;
pub use user::UserApi;

/// Serialize a request body or filter set.
pub(crate) fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Value, GatewayError> {
    serde_json::to_value(value)
        .map_err(|e| GatewayError::Unexpected(format!("Failed to encode request: {}", e)))
}
