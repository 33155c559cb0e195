use reqwest::Method;

use crate::gateway::error::GatewayError;
use crate::gateway::request::{Reply, RequestOptions};
use crate::gateway::Gateway;

/// A remote operation bound to a path and verb.
///
/// Defaults to POST. Each call merges its options over the declared
/// defaults, so `call(())`, `call(json!({..}))` and
/// `call(RequestOptions::with_params(..))` all take the same route.
#[derive(Clone)]
pub struct Resource {
    gateway: Gateway,
    path: String,
    method: Method,
    defaults: RequestOptions,
}

impl Resource {
    pub fn new(gateway: &Gateway, path: impl Into<String>) -> Self {
        Self {
            gateway: gateway.clone(),
            path: path.into(),
            method: Method::POST,
            defaults: RequestOptions::default(),
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_defaults(mut self, defaults: RequestOptions) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub async fn call(&self, options: impl Into<RequestOptions>) -> Result<Reply, GatewayError> {
        let options = self.defaults.clone().merge(options.into());
        self.gateway
            .dispatch(self.method.clone(), &self.path, options)
            .await
    }
}
