//! Shared test utilities and the stub backend.

#![allow(dead_code, unused_imports)]

pub mod stub_backend;

use std::sync::Arc;

use cardbook::config::Config;
use cardbook::gateway::Location;
use cardbook::Client;

pub use stub_backend::{StubBackend, PASSWORD};

/// Config pointing at `backend`, with a short throttle window so tests can
/// wait it out.
pub fn stub_config(backend: &StubBackend, window_ms: u64, page_size: u32) -> Config {
    let mut config = Config::default();
    config.api.base_url = backend.base_url();
    config.api.timeout_seconds = 5;
    config.throttle.window_ms = window_ms;
    config.records.page_size = page_size;
    config
}

/// Client against `backend` plus the location it redirects.
pub fn stub_client(backend: &StubBackend, window_ms: u64, page_size: u32) -> (Client, Location) {
    let location = Location::default();
    let client = Client::from_config(
        &stub_config(backend, window_ms, page_size),
        Arc::new(location.clone()),
    )
    .expect("Failed to build client");
    (client, location)
}

/// Client that is already logged in.
pub async fn logged_in_client(backend: &StubBackend, window_ms: u64, page_size: u32) -> Client {
    let (client, _) = stub_client(backend, window_ms, page_size);
    client
        .users()
        .login("13800000000", PASSWORD)
        .await
        .expect("Login against stub failed");
    client
}
