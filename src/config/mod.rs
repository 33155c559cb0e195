//! Configuration loading and storage.

mod credentials;
mod loader;
mod store;
mod types;

pub use credentials::{Credentials, SecureString};
pub use loader::ConfigError;
pub use store::ConfigStore;
pub use types::{ApiConfig, Config, NotificationConfig, RecordsConfig, ThrottleConfig};
