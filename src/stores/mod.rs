//! Client-side state stores.
//!
//! Each store mirrors one domain, exposes its state through an
//! [`Observable`], and re-fetches from the backend after every mutation
//! rather than patching local state.

mod card;
mod category;
mod error;
mod message;
mod observable;
mod record;
mod user;

use scopeguard::ScopeGuard;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::gateway::{GatewayError, Reply};

pub use card::{CardState, CardStore};
pub use category::{CategoryState, CategoryStore};
pub use error::StoreError;
pub use message::{MessageStore, Notification, Severity};
pub use observable::{Generation, Observable};
pub use record::{FetchMode, RecordState, RecordStore};
pub use user::{UserState, UserStore};

fn decode<T: DeserializeOwned>(reply: &Reply, what: &'static str) -> Result<T, StoreError> {
    reply
        .decode()
        .map_err(|source| StoreError::Decode { what, source })
}

/// A throttled duplicate with nothing cached carries no entity. Calls
/// that must return one treat it as a failure instead of decoding `{}`.
fn require_payload(reply: &Reply, what: &'static str) -> Result<(), StoreError> {
    if reply.is_empty_throttle() {
        tracing::warn!(what, "Duplicate request suppressed with nothing cached");
        let reason = format!("duplicate {} request suppressed", what);
        return Err(GatewayError::Unexpected(reason).into());
    }
    Ok(())
}

/// Lists come back as arrays; an empty object or null means "none".
fn decode_list<T: DeserializeOwned>(
    reply: &Reply,
    what: &'static str,
) -> Result<Vec<T>, StoreError> {
    match &reply.payload {
        Value::Null => Ok(Vec::new()),
        Value::Object(map) if map.is_empty() => Ok(Vec::new()),
        _ => decode(reply, what),
    }
}

/// Clears a loading flag on every exit path, unless a newer request has
/// started since `ticket` was issued.
fn loading_guard<'a, S>(
    state: &'a Observable<S>,
    generation: &'a Generation,
    ticket: u64,
    clear: impl FnOnce(&mut S) + 'a,
) -> ScopeGuard<(), impl FnOnce(()) + 'a> {
    scopeguard::guard((), move |_| {
        if generation.is_current(ticket) {
            state.update(clear);
        }
    })
}
