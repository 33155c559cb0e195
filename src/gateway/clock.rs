//! Time source for the throttle window.

use std::fmt::Debug;
use std::time::Instant;

/// Source of monotonic time.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> Instant;
}

/// System clock implementation using `Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
