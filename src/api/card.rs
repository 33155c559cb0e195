use reqwest::Method;

use crate::gateway::{Gateway, GatewayError, Reply, RequestOptions, Resource};
use crate::models::{CardDraft, CardFilters};

use super::encode;

/// `/card/*` endpoints.
#[derive(Clone)]
pub struct CardApi {
    gateway: Gateway,
}

impl CardApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn list(
        &self,
        filters: &CardFilters,
        options: RequestOptions,
    ) -> Result<Reply, GatewayError> {
        Resource::new(&self.gateway, "/card/list")
            .with_method(Method::GET)
            .with_defaults(RequestOptions::with_params(encode(filters)?))
            .call(options)
            .await
    }

    pub async fn add(&self, card: &CardDraft) -> Result<Reply, GatewayError> {
        Resource::new(&self.gateway, "/card/add")
            .call(encode(card)?)
            .await
    }

    pub async fn update(&self, card_id: &str, card: &CardDraft) -> Result<Reply, GatewayError> {
        Resource::new(&self.gateway, format!("/card/update/{}", card_id))
            .with_method(Method::PUT)
            .call(encode(card)?)
            .await
    }

    pub async fn delete(&self, card_id: &str) -> Result<Reply, GatewayError> {
        Resource::new(&self.gateway, format!("/card/delete/{}", card_id))
            .with_method(Method::DELETE)
            .call(())
            .await
    }

    pub async fn detail(&self, card_id: &str) -> Result<Reply, GatewayError> {
        Resource::new(&self.gateway, format!("/card/detail/{}", card_id))
            .with_method(Method::GET)
            .call(())
            .await
    }
}
