use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;

use crate::api::CardApi;
use crate::gateway::RequestOptions;
use crate::models::{Card, CardDraft, CardFilters};

use super::{
    decode, decode_list, loading_guard, require_payload, Generation, Observable, StoreError,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardState {
    pub cards: Vec<Card>,
    pub loading: bool,
}

/// Card list mirror.
///
/// Mutations never touch `cards` directly; they re-fetch the list past
/// the throttle once the backend has accepted the change.
#[derive(Clone)]
pub struct CardStore {
    api: CardApi,
    state: Arc<Observable<CardState>>,
    generation: Arc<Generation>,
}

impl CardStore {
    pub fn new(api: CardApi) -> Self {
        Self {
            api,
            state: Arc::new(Observable::new(CardState::default())),
            generation: Arc::new(Generation::default()),
        }
    }

    pub fn state(&self) -> CardState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<CardState> {
        self.state.subscribe()
    }

    pub fn cards(&self) -> Vec<Card> {
        self.state.read(|s| s.cards.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.state.read(|s| s.loading)
    }

    pub async fn fetch_cards(&self, filters: &CardFilters) -> Result<Vec<Card>, StoreError> {
        self.load(filters, RequestOptions::default()).await
    }

    pub async fn add_card(&self, card: &CardDraft) -> Result<Value, StoreError> {
        let reply = self
            .api
            .add(card)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to add card"))?;
        self.reconcile().await?;
        Ok(reply.payload)
    }

    pub async fn update_card(&self, card_id: &str, card: &CardDraft) -> Result<Value, StoreError> {
        let reply = self
            .api
            .update(card_id, card)
            .await
            .inspect_err(|e| tracing::error!(card_id, error = %e, "Failed to update card"))?;
        self.reconcile().await?;
        Ok(reply.payload)
    }

    pub async fn delete_card(&self, card_id: &str) -> Result<Value, StoreError> {
        let reply = self
            .api
            .delete(card_id)
            .await
            .inspect_err(|e| tracing::error!(card_id, error = %e, "Failed to delete card"))?;
        self.reconcile().await?;
        Ok(reply.payload)
    }

    /// Single card, not kept in state.
    pub async fn card_detail(&self, card_id: &str) -> Result<Card, StoreError> {
        let reply = self
            .api
            .detail(card_id)
            .await
            .inspect_err(|e| tracing::error!(card_id, error = %e, "Failed to fetch card"))?;
        require_payload(&reply, "card detail")?;
        decode(&reply, "card")
    }

    async fn reconcile(&self) -> Result<Vec<Card>, StoreError> {
        self.load(
            &CardFilters::default(),
            RequestOptions::default().ignoring_rate_limit(),
        )
        .await
    }

    async fn load(
        &self,
        filters: &CardFilters,
        options: RequestOptions,
    ) -> Result<Vec<Card>, StoreError> {
        let ticket = self.generation.begin();
        self.state.update(|s| s.loading = true);
        let _loading = loading_guard(&self.state, &self.generation, ticket, |s| {
            s.loading = false
        });

        let reply = self
            .api
            .list(filters, options)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to fetch cards"))?;
        if reply.is_empty_throttle() {
            return Ok(self.cards());
        }

        let cards: Vec<Card> = decode_list(&reply, "card list")?;
        if self.generation.is_current(ticket) {
            let fresh = cards.clone();
            self.state.update(|s| s.cards = fresh);
        } else {
            tracing::debug!(ticket, "Discarding superseded card list");
        }
        Ok(cards)
    }
}
