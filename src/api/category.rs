use reqwest::Method;

use crate::gateway::{Gateway, GatewayError, Reply, RequestOptions, Resource};
use crate::models::CategoryDraft;

use super::encode;

/// The two category families share one route shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    Swipe,
    Consumption,
}

impl CategoryKind {
    fn list_path(self) -> &'static str {
        match self {
            CategoryKind::Swipe => "/category/swipe-types",
            CategoryKind::Consumption => "/category/consumption-types",
        }
    }

    fn item_path(self) -> &'static str {
        match self {
            CategoryKind::Swipe => "/category/swipe-type",
            CategoryKind::Consumption => "/category/consumption-type",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CategoryKind::Swipe => "swipe type",
            CategoryKind::Consumption => "consumption type",
        }
    }
}

/// `/category/*` endpoints.
#[derive(Clone)]
pub struct CategoryApi {
    gateway: Gateway,
}

impl CategoryApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn list(
        &self,
        kind: CategoryKind,
        options: RequestOptions,
    ) -> Result<Reply, GatewayError> {
        Resource::new(&self.gateway, kind.list_path())
            .with_method(Method::GET)
            .call(options)
            .await
    }

    pub async fn add(
        &self,
        kind: CategoryKind,
        draft: &CategoryDraft,
    ) -> Result<Reply, GatewayError> {
        Resource::new(&self.gateway, kind.item_path())
            .call(encode(draft)?)
            .await
    }

    pub async fn update(
        &self,
        kind: CategoryKind,
        type_id: &str,
        draft: &CategoryDraft,
    ) -> Result<Reply, GatewayError> {
        Resource::new(&self.gateway, format!("{}/{}", kind.item_path(), type_id))
            .with_method(Method::PUT)
            .call(encode(draft)?)
            .await
    }

    pub async fn delete(&self, kind: CategoryKind, type_id: &str) -> Result<Reply, GatewayError> {
        Resource::new(&self.gateway, format!("{}/{}", kind.item_path(), type_id))
            .with_method(Method::DELETE)
            .call(())
            .await
    }
}
