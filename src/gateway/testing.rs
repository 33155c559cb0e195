//! In-process transport and clock for unit tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::config::ThrottleConfig;
use crate::gateway::clock::Clock;
use crate::gateway::error::TransportError;
use crate::gateway::navigator::Location;
use crate::gateway::request::{ApiRequest, TransportResponse};
use crate::gateway::transport::Transport;
use crate::gateway::Gateway;

/// Clock that only moves when told to.
///
/// All clones share the same underlying time value.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new(start: Instant) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, duration: Duration) {
        *self.current.lock() += duration;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.current.lock()
    }
}

struct Scripted {
    delay: Duration,
    result: Result<TransportResponse, TransportError>,
}

/// Answers requests from a queue, in order, and records what was sent.
///
/// An empty queue answers `{"errcode": 0, "ret": {}}`.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    queue: Arc<Mutex<VecDeque<Scripted>>>,
    sent: Arc<Mutex<Vec<ApiRequest>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, body: Value) {
        self.push_response(200, body, Duration::ZERO);
    }

    pub fn push_delayed(&self, body: Value, delay: Duration) {
        self.push_response(200, body, delay);
    }

    pub fn push_response(&self, status: u16, body: Value, delay: Duration) {
        self.queue.lock().push_back(Scripted {
            delay,
            result: Ok(TransportResponse::new(status, body)),
        });
    }

    pub fn push_error(&self, err: TransportError) {
        self.queue.lock().push_back(Scripted {
            delay: Duration::ZERO,
            result: Err(err),
        });
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.sent.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<TransportResponse, TransportError> {
        self.sent.lock().push(request.clone());
        let next = self.queue.lock().pop_front();
        let Some(scripted) = next else {
            return Ok(TransportResponse::new(
                200,
                serde_json::json!({"errcode": 0, "ret": {}}),
            ));
        };
        if !scripted.delay.is_zero() {
            tokio::time::sleep(scripted.delay).await;
        }
        scripted.result
    }
}

/// Gateway over `transport` with a 3 s window, a manual clock and a
/// location starting at `/`.
pub fn gateway_with(transport: ScriptedTransport) -> (Gateway, ManualClock, Location) {
    let clock = ManualClock::default();
    let location = Location::default();
    let gateway = Gateway::builder(Arc::new(transport))
        .navigator(Arc::new(location.clone()))
        .throttle(ThrottleConfig::default())
        .clock(Arc::new(clock.clone()))
        .build();
    (gateway, clock, location)
}

mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances_all_clones() {
        let start = Instant::now();
        let clock = ManualClock::new(start);
        let other = clock.clone();

        assert_eq!(clock.now(), start);
        other.advance(Duration::from_secs(10));
        assert_eq!(clock.now(), start + Duration::from_secs(10));
    }
}
