use crate::config::Credentials;
use crate::gateway::{Gateway, GatewayError, Reply, Resource};

/// `/user/*` endpoints. All POST.
#[derive(Clone)]
pub struct UserApi {
    gateway: Gateway,
}

impl UserApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<Reply, GatewayError> {
        Resource::new(&self.gateway, "/user/login")
            .call(credentials.to_body())
            .await
    }

    pub async fn logout(&self) -> Result<Reply, GatewayError> {
        Resource::new(&self.gateway, "/user/logout").call(()).await
    }

    /// Current user from the server-held session.
    pub async fn current(&self) -> Result<Reply, GatewayError> {
        Resource::new(&self.gateway, "/user/get").call(()).await
    }
}
