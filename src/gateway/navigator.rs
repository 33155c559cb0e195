//! Navigation capability used for auth-expiry redirects.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

/// Path of the login screen.
pub const LOGIN_PATH: &str = "/login";

/// Whatever owns "where the user currently is".
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    fn redirect(&self, path: &str);
}

/// In-memory navigation target.
///
/// Clones share the same location.
#[derive(Debug, Clone)]
pub struct Location {
    path: Arc<RwLock<String>>,
    redirects: Arc<AtomicUsize>,
}

impl Location {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            path: Arc::new(RwLock::new(initial.into())),
            redirects: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Move without counting it as a redirect (the user navigated).
    pub fn set_path(&self, path: impl Into<String>) {
        *self.path.write() = path.into();
    }

    /// Number of redirects issued through [`Navigator::redirect`].
    pub fn redirect_count(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for Location {
    fn current_path(&self) -> String {
        self.path.read().clone()
    }

    fn redirect(&self, path: &str) {
        let previous = std::mem::replace(&mut *self.path.write(), path.to_string());
        self.redirects.fetch_add(1, Ordering::SeqCst);
        tracing::info!(from = %previous, to = %path, "Redirecting");
    }
}
