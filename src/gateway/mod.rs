//! Request gateway.
//!
//! Every backend call goes through [`Gateway::dispatch`], which
//!
//! - suppresses duplicates of a request sent within the throttle window,
//!   answering them from the last payload seen,
//! - unwraps the `{errcode, ret}` envelope,
//! - turns a 401 into a redirect to the login screen,
//! - normalizes everything else into [`GatewayError`].

pub mod clock;
pub mod envelope;
pub mod error;
pub mod navigator;
pub mod request;
pub mod resource;
pub mod signature;
pub mod throttle;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;
use std::time::Instant;

use reqwest::Method;
use serde_json::Value;
use uuid::Uuid;

use crate::config::{Config, ThrottleConfig};

pub use clock::{Clock, SystemClock};
pub use envelope::unwrap_envelope;
pub use error::{GatewayError, TransportError};
pub use navigator::{Location, Navigator, LOGIN_PATH};
pub use request::{ApiRequest, Reply, ReplyOrigin, RequestOptions, TransportResponse};
pub use resource::Resource;
pub use signature::RequestSignature;
pub use throttle::{Admission, ThrottleCache};
pub use transport::{HttpTransport, Transport};

const UNAUTHORIZED: u16 = 401;

/// Shared handle to the request pipeline. Cheap to clone.
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    transport: Arc<dyn Transport>,
    navigator: Arc<dyn Navigator>,
    throttle: ThrottleCache,
}

/// Builder for [`Gateway`].
pub struct GatewayBuilder {
    transport: Arc<dyn Transport>,
    navigator: Arc<dyn Navigator>,
    throttle: ThrottleConfig,
    clock: Arc<dyn Clock>,
}

impl GatewayBuilder {
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    pub fn throttle(mut self, throttle: ThrottleConfig) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> Gateway {
        Gateway {
            inner: Arc::new(GatewayInner {
                transport: self.transport,
                navigator: self.navigator,
                throttle: ThrottleCache::with_clock(&self.throttle, self.clock),
            }),
        }
    }
}

impl Gateway {
    pub fn builder(transport: Arc<dyn Transport>) -> GatewayBuilder {
        GatewayBuilder {
            transport,
            navigator: Arc::new(Location::default()),
            throttle: ThrottleConfig::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Gateway talking HTTP to the backend described by `config`.
    pub fn from_config(
        config: &Config,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(&config.api)?;
        Ok(Self::builder(Arc::new(transport))
            .navigator(navigator)
            .throttle(config.throttle.clone())
            .build())
    }

    pub fn throttle(&self) -> &ThrottleCache {
        &self.inner.throttle
    }

    /// Send a request and return only its payload.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<Value, GatewayError> {
        self.dispatch(method, path, options)
            .await
            .map(|reply| reply.payload)
    }

    /// Send a request, reporting whether the payload came from the network.
    pub async fn dispatch(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<Reply, GatewayError> {
        let signature = RequestSignature::compute(
            &method,
            path,
            options.params.as_ref(),
            options.body.as_ref(),
        );
        let request_id = Uuid::new_v4().to_string();

        if let Admission::Throttled(cached) =
            self.inner.throttle.admit(&signature, options.ignore_rate_limit)
        {
            tracing::debug!(
                request_id = %request_id,
                method = %method,
                path,
                cached = cached.is_some(),
                "Rate limited request"
            );
            return Ok(match cached {
                Some(payload) => Reply {
                    payload,
                    origin: ReplyOrigin::Cache,
                },
                None => Reply {
                    payload: envelope::empty_payload(),
                    origin: ReplyOrigin::Throttled,
                },
            });
        }

        let request = ApiRequest {
            request_id,
            method,
            path: path.to_string(),
            params: options.params,
            body: options.body,
        };

        let started = Instant::now();
        let result = self.inner.transport.execute(&request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(
                    request_id = %request.request_id,
                    method = %request.method,
                    path = %request.path,
                    elapsed_ms,
                    error = %err,
                    "API request failed"
                );
                return Err(err.into());
            }
        };

        tracing::debug!(
            request_id = %request.request_id,
            method = %request.method,
            path = %request.path,
            status = response.status,
            elapsed_ms,
            "API response"
        );

        self.handle_response(&request, &signature, response)
    }

    fn handle_response(
        &self,
        request: &ApiRequest,
        signature: &RequestSignature,
        response: TransportResponse,
    ) -> Result<Reply, GatewayError> {
        if response.status == UNAUTHORIZED {
            self.redirect_to_login();
            tracing::warn!(
                request_id = %request.request_id,
                path = %request.path,
                "Session expired"
            );
            return Err(GatewayError::AuthExpired);
        }

        if !response.is_success() {
            tracing::warn!(
                request_id = %request.request_id,
                path = %request.path,
                status = response.status,
                "Server error response"
            );
            return Err(GatewayError::Server {
                status: response.status,
                payload: response.body,
            });
        }

        let payload = unwrap_envelope(response.body).inspect_err(|err| {
            tracing::warn!(
                request_id = %request.request_id,
                path = %request.path,
                error = %err,
                "API returned error code"
            );
        })?;

        self.inner.throttle.store(signature, payload.clone());
        Ok(Reply::network(payload))
    }

    // Already on the login screen means no redirect, which breaks loops.
    fn redirect_to_login(&self) {
        let navigator = &self.inner.navigator;
        if navigator.current_path() != LOGIN_PATH {
            navigator.redirect(LOGIN_PATH);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{gateway_with, ScriptedTransport};
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_duplicate_within_window_never_reaches_network() {
        let transport = ScriptedTransport::new();
        transport.push_ok(json!({"errcode": 0, "ret": [{"id": "c1"}]}));
        let (gateway, clock, _) = gateway_with(transport.clone());

        let first = gateway
            .dispatch(Method::GET, "/card/list", RequestOptions::default())
            .await
            .unwrap();
        clock.advance(Duration::from_millis(2999));
        let second = gateway
            .dispatch(Method::GET, "/card/list", RequestOptions::default())
            .await
            .unwrap();

        assert_eq!(transport.request_count(), 1);
        assert_eq!(first.origin, ReplyOrigin::Network);
        assert_eq!(second.origin, ReplyOrigin::Cache);
        assert_eq!(second.payload, first.payload);
    }

    #[tokio::test]
    async fn test_duplicate_after_window_is_sent() {
        let transport = ScriptedTransport::new();
        let (gateway, clock, _) = gateway_with(transport.clone());

        gateway
            .send(Method::POST, "/card/add", RequestOptions::with_body(json!({"bank": "CMB"})))
            .await
            .unwrap();
        clock.advance(Duration::from_millis(3000));
        gateway
            .send(Method::POST, "/card/add", RequestOptions::with_body(json!({"bank": "CMB"})))
            .await
            .unwrap();

        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_throttled_without_cache_resolves_empty() {
        let transport = ScriptedTransport::new();
        // First call fails, so nothing is cached for the signature.
        transport.push_response(500, json!({"errcode": 10000}), Duration::ZERO);
        let (gateway, _, _) = gateway_with(transport.clone());

        let first = gateway
            .dispatch(Method::GET, "/record/stats", RequestOptions::default())
            .await;
        assert!(matches!(first, Err(GatewayError::Server { status: 500, .. })));

        let second = gateway
            .dispatch(Method::GET, "/record/stats", RequestOptions::default())
            .await
            .unwrap();
        assert!(second.is_empty_throttle());
        assert_eq!(second.payload, json!({}));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_get_paths_are_never_throttled() {
        let transport = ScriptedTransport::new();
        let (gateway, _, _) = gateway_with(transport.clone());

        for _ in 0..3 {
            gateway
                .dispatch(Method::POST, "/user/get", RequestOptions::default())
                .await
                .unwrap();
        }
        gateway
            .dispatch(Method::GET, "/record/query", RequestOptions::default())
            .await
            .unwrap();

        assert_eq!(transport.request_count(), 4);
        assert!(gateway.throttle().is_empty());
    }

    #[tokio::test]
    async fn test_ignore_rate_limit_sends_duplicate() {
        let transport = ScriptedTransport::new();
        let (gateway, _, _) = gateway_with(transport.clone());

        gateway
            .dispatch(Method::GET, "/card/list", RequestOptions::default())
            .await
            .unwrap();
        let forced = gateway
            .dispatch(
                Method::GET,
                "/card/list",
                RequestOptions::default().ignoring_rate_limit(),
            )
            .await
            .unwrap();

        assert_eq!(forced.origin, ReplyOrigin::Network);
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_envelope_error_is_api_error() {
        let transport = ScriptedTransport::new();
        transport.push_ok(json!({"errcode": 10001, "errmsg": "无效的参数"}));
        let (gateway, _, _) = gateway_with(transport);

        let err = gateway
            .send(Method::POST, "/card/add", RequestOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Api { code: 10001, .. }));
        assert_eq!(err.to_string(), "无效的参数");
    }

    #[tokio::test]
    async fn test_unauthorized_redirects_once() {
        let transport = ScriptedTransport::new();
        transport.push_response(401, json!({"detail": "unauthorized"}), Duration::ZERO);
        let (gateway, _, location) = gateway_with(transport);
        location.set_path("/records");

        let err = gateway
            .send(Method::GET, "/record/list", RequestOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::AuthExpired));
        assert_eq!(location.redirect_count(), 1);
        assert_eq!(location.current_path(), LOGIN_PATH);
    }

    #[tokio::test]
    async fn test_unauthorized_on_login_page_does_not_redirect() {
        let transport = ScriptedTransport::new();
        transport.push_response(401, Value::Null, Duration::ZERO);
        let (gateway, _, location) = gateway_with(transport);
        location.set_path(LOGIN_PATH);

        let err = gateway
            .send(Method::POST, "/user/get", RequestOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::AuthExpired));
        assert_eq!(location.redirect_count(), 0);
    }

    #[tokio::test]
    async fn test_no_response_is_network_error() {
        let transport = ScriptedTransport::new();
        transport.push_error(TransportError::NoResponse {
            url: "http://127.0.0.1:1/api/card/list".to_string(),
            reason: "connection refused".to_string(),
        });
        let (gateway, _, _) = gateway_with(transport);

        let err = gateway
            .send(Method::GET, "/card/list", RequestOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Network(_)));
    }

    #[tokio::test]
    async fn test_server_error_keeps_payload() {
        let transport = ScriptedTransport::new();
        transport.push_response(
            422,
            json!({"detail": [{"msg": "field required"}]}),
            Duration::ZERO,
        );
        let (gateway, _, _) = gateway_with(transport);

        match gateway
            .send(Method::POST, "/record/add", RequestOptions::default())
            .await
        {
            Err(GatewayError::Server { status, payload }) => {
                assert_eq!(status, 422);
                assert_eq!(payload["detail"][0]["msg"], "field required");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
