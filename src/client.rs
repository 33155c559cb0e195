//! Everything a front end needs, wired over one gateway.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::api::{CardApi, CategoryApi, HomeApi, RecordApi, UserApi};
use crate::config::Config;
use crate::gateway::{Gateway, Navigator, TransportError};
use crate::stores::{
    CardStore, CategoryStore, MessageStore, RecordStore, StoreError, UserStore,
};

/// Gateway plus one store per domain, sharing the throttle cache and the
/// session cookie jar.
#[derive(Clone)]
pub struct Client {
    gateway: Gateway,
    home: HomeApi,
    cards: CardStore,
    categories: CategoryStore,
    records: RecordStore,
    users: UserStore,
    messages: MessageStore,
}

impl Client {
    pub fn from_config(
        config: &Config,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, TransportError> {
        let gateway = Gateway::from_config(config, navigator)?;
        Ok(Self::with_gateway(gateway, config))
    }

    pub fn with_gateway(gateway: Gateway, config: &Config) -> Self {
        Self {
            home: HomeApi::new(gateway.clone()),
            cards: CardStore::new(CardApi::new(gateway.clone())),
            categories: CategoryStore::new(CategoryApi::new(gateway.clone())),
            records: RecordStore::new(RecordApi::new(gateway.clone()), config.records.page_size),
            users: UserStore::new(UserApi::new(gateway.clone())),
            messages: MessageStore::new(Duration::from_millis(config.notifications.duration_ms)),
            gateway,
        }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn cards(&self) -> &CardStore {
        &self.cards
    }

    pub fn categories(&self) -> &CategoryStore {
        &self.categories
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    pub fn users(&self) -> &UserStore {
        &self.users
    }

    pub fn messages(&self) -> &MessageStore {
        &self.messages
    }

    /// Home page summary; the shape is owned by the backend.
    pub async fn dashboard(&self) -> Result<Value, StoreError> {
        let reply = self
            .home
            .dashboard()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to fetch dashboard"))?;
        Ok(reply.payload)
    }

    /// Surface `err` as an error notification.
    pub fn report(&self, err: &StoreError) {
        self.messages.error(err.user_message());
    }
}
