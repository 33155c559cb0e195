use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub throttle: ThrottleConfig,
    #[serde(default)]
    pub records: RecordsConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

/// Where the backend lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Scheme + host + port of the backend (e.g., "http://127.0.0.1:8000").
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path prefix every API route is mounted under.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Total request timeout in seconds (default: 10).
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Connection timeout in seconds (default: 5).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u32,
}

/// Duplicate-request throttling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Identical requests inside this window are answered from cache (default: 3000).
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
    /// Upper bound on remembered request signatures (default: 512).
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

/// Record list paging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordsConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

/// Transient message defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// How long a message stays visible, in milliseconds (default: 3000).
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_prefix() -> String {
    "/api".to_string()
}

fn default_timeout() -> u32 {
    10
}

fn default_connect_timeout() -> u32 {
    5
}

fn default_window_ms() -> u64 {
    3000
}

fn default_max_entries() -> usize {
    512
}

fn default_page_size() -> u32 {
    20
}

fn default_duration_ms() -> u64 {
    3000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            prefix: default_prefix(),
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            max_entries: default_max_entries(),
        }
    }
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_duration_ms(),
        }
    }
}

impl ApiConfig {
    /// Full URL for an API path, e.g. `/card/list` -> `http://host/api/card/list`.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}{}{}",
            self.base_url.trim_end_matches('/'),
            self.prefix.trim_end_matches('/'),
            path
        )
    }
}
