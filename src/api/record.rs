use reqwest::Method;
use serde_json::Value;

use crate::gateway::{Gateway, GatewayError, Reply, RequestOptions, Resource};
use crate::models::RecordDraft;

use super::encode;

/// `/record/*` endpoints.
#[derive(Clone)]
pub struct RecordApi {
    gateway: Gateway,
}

impl RecordApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// `params` carries `page`, `page_size` and any filters.
    pub async fn list(&self, params: Value, ignore_rate_limit: bool) -> Result<Reply, GatewayError> {
        let mut options = RequestOptions::with_params(params);
        options.ignore_rate_limit = ignore_rate_limit;
        Resource::new(&self.gateway, "/record/list")
            .with_method(Method::GET)
            .call(options)
            .await
    }

    pub async fn add(&self, record: &RecordDraft) -> Result<Reply, GatewayError> {
        Resource::new(&self.gateway, "/record/add")
            .call(encode(record)?)
            .await
    }

    pub async fn update(
        &self,
        record_id: &str,
        record: &RecordDraft,
    ) -> Result<Reply, GatewayError> {
        Resource::new(&self.gateway, format!("/record/update/{}", record_id))
            .with_method(Method::PUT)
            .call(encode(record)?)
            .await
    }

    pub async fn delete(&self, record_id: &str) -> Result<Reply, GatewayError> {
        Resource::new(&self.gateway, format!("/record/delete/{}", record_id))
            .with_method(Method::DELETE)
            .call(())
            .await
    }

    pub async fn stats(&self, params: Value) -> Result<Reply, GatewayError> {
        Resource::new(&self.gateway, "/record/stats")
            .with_method(Method::GET)
            .call(RequestOptions::with_params(params))
            .await
    }

    pub async fn recent_consumptions(&self) -> Result<Reply, GatewayError> {
        Resource::new(&self.gateway, "/record/recent-consumptions")
            .with_method(Method::GET)
            .call(())
            .await
    }
}
