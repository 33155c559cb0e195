use reqwest::Method;

use crate::gateway::{Gateway, GatewayError, Reply, Resource};

/// `/home/*` endpoints.
#[derive(Clone)]
pub struct HomeApi {
    gateway: Gateway,
}

impl HomeApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Month-to-date summary; the shape is owned by the backend.
    pub async fn dashboard(&self) -> Result<Reply, GatewayError> {
        Resource::new(&self.gateway, "/home/dashboard")
            .with_method(Method::GET)
            .call(())
            .await
    }
}
