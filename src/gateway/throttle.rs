//! Bounded duplicate-request cache.
//!
//! Remembers, per request signature, when the request was last sent and
//! the last payload it produced. A repeat inside the window is answered
//! from here instead of the network.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde_json::Value;

use crate::config::ThrottleConfig;
use crate::gateway::clock::{Clock, SystemClock};
use crate::gateway::signature::RequestSignature;

/// Outcome of asking the cache whether a request may go out.
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    /// Send it; the dispatch time has been recorded.
    Proceed,
    /// Duplicate inside the window. Carries the last payload, if any.
    Throttled(Option<Value>),
}

#[derive(Debug)]
struct ThrottleEntry {
    dispatched_at: Instant,
    payload: Option<Value>,
}

/// Signature-keyed throttle and response cache owned by one gateway.
///
/// Entries older than the window are useless (they can never throttle
/// again) and are swept whenever room is needed. If the cache is still
/// full after a sweep, the entry dispatched longest ago is evicted.
#[derive(Debug)]
pub struct ThrottleCache {
    window: Duration,
    max_entries: usize,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<RequestSignature, ThrottleEntry>>,
}

impl ThrottleCache {
    pub fn new(config: &ThrottleConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &ThrottleConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            window: Duration::from_millis(config.window_ms),
            max_entries: config.max_entries.max(1),
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Decide whether a request with `signature` may be sent now.
    ///
    /// The empty signature always proceeds and is never recorded.
    /// `ignore_rate_limit` skips the window check but still records the
    /// dispatch, so later duplicates are throttled against it.
    pub fn admit(&self, signature: &RequestSignature, ignore_rate_limit: bool) -> Admission {
        if signature.is_empty() {
            return Admission::Proceed;
        }

        let now = self.clock.now();
        let mut entries = self.entries.lock();

        if let Some(entry) = entries.get_mut(signature) {
            if !ignore_rate_limit && now.saturating_duration_since(entry.dispatched_at) < self.window
            {
                return Admission::Throttled(entry.payload.clone());
            }
            entry.dispatched_at = now;
            return Admission::Proceed;
        }

        self.make_room(&mut entries, now);
        entries.insert(
            signature.clone(),
            ThrottleEntry {
                dispatched_at: now,
                payload: None,
            },
        );
        Admission::Proceed
    }

    /// Remember the unwrapped payload of a successful response.
    pub fn store(&self, signature: &RequestSignature, payload: Value) {
        if signature.is_empty() {
            return;
        }

        let now = self.clock.now();
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get_mut(signature) {
            entry.payload = Some(payload);
            return;
        }

        // Evicted while the request was in flight.
        self.make_room(&mut entries, now);
        entries.insert(
            signature.clone(),
            ThrottleEntry {
                dispatched_at: now,
                payload: Some(payload),
            },
        );
    }

    /// Drop every entry whose window has passed. Returns how many went.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, e| now.saturating_duration_since(e.dispatched_at) < self.window);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn make_room(&self, entries: &mut HashMap<RequestSignature, ThrottleEntry>, now: Instant) {
        if entries.len() < self.max_entries {
            return;
        }

        entries.retain(|_, e| now.saturating_duration_since(e.dispatched_at) < self.window);

        while entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.dispatched_at)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(key) => {
                    tracing::debug!(signature = %key, "Evicting throttle entry");
                    entries.remove(&key);
                }
                None => break,
            }
        }
    }
}
