//! Client core for the cardbook credit-card ledger backend.
//!
//! [`gateway`] moves requests (throttling, envelope handling, session
//! expiry), [`api`] names the remote operations and [`stores`] keep an
//! observable mirror of server state for a front end to render.

pub mod api;
pub mod client;
pub mod config;
pub mod gateway;
pub mod models;
pub mod stores;

pub use client::Client;

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. `RUST_LOG` overrides the `info`
/// default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();
}
