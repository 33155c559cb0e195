//! Observable state container backing every store.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

/// State that can be read synchronously and watched for changes.
///
/// Writes are synchronous and visible to the next read. Every write that
/// changes something wakes all receivers handed out by `subscribe`.
#[derive(Debug)]
pub struct Observable<S> {
    tx: watch::Sender<S>,
}

impl<S> Observable<S> {
    pub fn new(initial: S) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.tx.subscribe()
    }

    /// Run `f` against the current value.
    ///
    /// `f` must not write to the same observable.
    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.tx.borrow())
    }

    pub fn update(&self, f: impl FnOnce(&mut S)) {
        self.tx.send_modify(f);
    }

    /// Apply `f`; receivers are only notified when it returns `true`.
    pub fn update_if(&self, f: impl FnOnce(&mut S) -> bool) -> bool {
        self.tx.send_if_modified(f)
    }
}

impl<S: Clone> Observable<S> {
    pub fn snapshot(&self) -> S {
        self.tx.borrow().clone()
    }
}

/// Monotonic request counter used to drop responses that lost the race.
#[derive(Debug, Default)]
pub struct Generation(AtomicU64);

impl Generation {
    /// Start a new request; returns its ticket.
    pub fn begin(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.0.load(Ordering::SeqCst) == ticket
    }
}
