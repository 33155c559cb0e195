//! Transient user-facing notifications.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::{Generation, Observable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    Success,
    #[default]
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Notification {
    pub text: String,
    pub severity: Severity,
    pub visible: bool,
}

/// Single-slot notification with auto-hide.
///
/// A new message replaces the current one and restarts the timer. A zero
/// duration keeps the message up until `hide` is called. Auto-hide needs
/// a Tokio runtime; without one the message stays visible.
#[derive(Clone)]
pub struct MessageStore {
    state: Arc<Observable<Notification>>,
    generation: Arc<Generation>,
    timer: Arc<Mutex<Option<JoinHandle<()>>>>,
    default_duration: Duration,
}

impl MessageStore {
    pub fn new(default_duration: Duration) -> Self {
        Self {
            state: Arc::new(Observable::new(Notification::default())),
            generation: Arc::new(Generation::default()),
            timer: Arc::new(Mutex::new(None)),
            default_duration,
        }
    }

    pub fn current(&self) -> Notification {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Notification> {
        self.state.subscribe()
    }

    pub fn show(&self, text: impl Into<String>, severity: Severity, duration: Duration) {
        let text = text.into();
        // Held until the new timer is in place, so the slot always belongs
        // to the latest ticket.
        let mut timer = self.timer.lock();
        let mut ticket = 0;
        self.state.update(|n| {
            ticket = self.generation.begin();
            *n = Notification {
                text,
                severity,
                visible: true,
            };
        });

        if let Some(previous) = timer.take() {
            previous.abort();
        }
        if duration.is_zero() {
            return;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let state = Arc::clone(&self.state);
                let generation = Arc::clone(&self.generation);
                *timer = Some(runtime.spawn(async move {
                    tokio::time::sleep(duration).await;
                    state.update_if(|n| {
                        if !generation.is_current(ticket) || !n.visible {
                            return false;
                        }
                        n.visible = false;
                        true
                    });
                }));
            }
            Err(_) => tracing::warn!("No runtime available, notification will not auto-hide"),
        }
    }

    pub fn hide(&self) {
        let mut timer = self.timer.lock();
        self.state.update_if(|n| {
            self.generation.begin();
            let changed = n.visible;
            n.visible = false;
            changed
        });
        if let Some(pending) = timer.take() {
            pending.abort();
        }
    }

    pub fn success(&self, text: impl Into<String>) {
        self.show(text, Severity::Success, self.default_duration);
    }

    pub fn info(&self, text: impl Into<String>) {
        self.show(text, Severity::Info, self.default_duration);
    }

    pub fn warning(&self, text: impl Into<String>) {
        self.show(text, Severity::Warning, self.default_duration);
    }

    pub fn error(&self, text: impl Into<String>) {
        self.show(text, Severity::Error, self.default_duration);
    }
}
