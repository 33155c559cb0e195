use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;

use crate::config::ApiConfig;
use crate::gateway::error::TransportError;
use crate::gateway::request::{ApiRequest, TransportResponse};

/// Moves a request to the backend and brings back status + JSON body.
///
/// Non-2xx answers are responses, not errors; only "nothing came back"
/// is an error at this level.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &ApiRequest) -> Result<TransportResponse, TransportError>;
}

/// HTTP transport backed by `reqwest`.
///
/// Keeps a cookie store so the session cookie set by `/user/login`
/// rides along on every later call.
pub struct HttpTransport {
    client: Client,
    api: ApiConfig,
}

impl HttpTransport {
    pub fn new(api: &ApiConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(api.connect_timeout_seconds as u64))
            .timeout(Duration::from_secs(api.timeout_seconds as u64))
            .cookie_store(true)
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;

        Ok(Self {
            client,
            api: api.clone(),
        })
    }

    fn url_for(&self, request: &ApiRequest) -> Result<Url, TransportError> {
        let endpoint = self.api.endpoint(&request.path);
        let mut url = Url::parse(&endpoint).map_err(|e| {
            TransportError::InvalidRequest(format!("Invalid URL '{}': {}", endpoint, e))
        })?;

        if let Some(params) = &request.params {
            let pairs = query_pairs(params);
            if !pairs.is_empty() {
                url.query_pairs_mut().extend_pairs(pairs);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<TransportResponse, TransportError> {
        let url = self.url_for(request)?;
        let mut builder = self.client.request(request.method.clone(), url.clone());

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| self.classify(&url, e))?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|e| self.classify(&url, e))?;

        tracing::trace!(
            request_id = %request.request_id,
            status,
            bytes = bytes.len(),
            "Transport response"
        );

        Ok(TransportResponse::new(status, parse_body(&bytes)))
    }
}

impl HttpTransport {
    fn classify(&self, url: &Url, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout {
                duration: self.api.timeout_seconds as u64,
            }
        } else {
            TransportError::NoResponse {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

/// Flatten JSON params into query pairs.
///
/// Nulls are dropped, arrays repeat the key, nested objects are sent as
/// compact JSON.
pub fn query_pairs(params: &Value) -> Vec<(String, String)> {
    let Value::Object(map) = params else {
        return Vec::new();
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        match value {
            Value::Array(items) => {
                for item in items {
                    if let Some(s) = scalar(item) {
                        pairs.push((key.clone(), s));
                    }
                }
            }
            other => {
                if let Some(s) = scalar(other) {
                    pairs.push((key.clone(), s));
                }
            }
        }
    }
    pairs
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

fn parse_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
