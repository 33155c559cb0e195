use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;

use crate::api::{CategoryApi, CategoryKind};
use crate::gateway::RequestOptions;
use crate::models::{CategoryDraft, ConsumptionType, SwipeType};

use super::{decode_list, loading_guard, Generation, Observable, StoreError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryState {
    pub swipe_types: Vec<SwipeType>,
    pub consumption_types: Vec<ConsumptionType>,
    swipe_loading: bool,
    consumption_loading: bool,
}

impl CategoryState {
    /// True while either list is being fetched.
    pub fn loading(&self) -> bool {
        self.swipe_loading || self.consumption_loading
    }

    fn swipe_types_mut(&mut self) -> &mut Vec<SwipeType> {
        &mut self.swipe_types
    }

    fn consumption_types_mut(&mut self) -> &mut Vec<ConsumptionType> {
        &mut self.consumption_types
    }

    fn set_loading(&mut self, kind: CategoryKind, loading: bool) {
        match kind {
            CategoryKind::Swipe => self.swipe_loading = loading,
            CategoryKind::Consumption => self.consumption_loading = loading,
        }
    }
}

/// Mirror of both category families.
#[derive(Clone)]
pub struct CategoryStore {
    api: CategoryApi,
    state: Arc<Observable<CategoryState>>,
    swipe_generation: Arc<Generation>,
    consumption_generation: Arc<Generation>,
}

impl CategoryStore {
    pub fn new(api: CategoryApi) -> Self {
        Self {
            api,
            state: Arc::new(Observable::new(CategoryState::default())),
            swipe_generation: Arc::new(Generation::default()),
            consumption_generation: Arc::new(Generation::default()),
        }
    }

    pub fn state(&self) -> CategoryState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<CategoryState> {
        self.state.subscribe()
    }

    pub async fn fetch_swipe_types(&self) -> Result<Vec<SwipeType>, StoreError> {
        self.load(
            CategoryKind::Swipe,
            RequestOptions::default(),
            CategoryState::swipe_types_mut,
        )
        .await
    }

    pub async fn fetch_consumption_types(&self) -> Result<Vec<ConsumptionType>, StoreError> {
        self.load(
            CategoryKind::Consumption,
            RequestOptions::default(),
            CategoryState::consumption_types_mut,
        )
        .await
    }

    pub async fn add_swipe_type(&self, draft: &CategoryDraft) -> Result<Value, StoreError> {
        self.add(CategoryKind::Swipe, draft).await
    }

    pub async fn update_swipe_type(
        &self,
        type_id: &str,
        draft: &CategoryDraft,
    ) -> Result<Value, StoreError> {
        self.update(CategoryKind::Swipe, type_id, draft).await
    }

    pub async fn delete_swipe_type(&self, type_id: &str) -> Result<Value, StoreError> {
        self.delete(CategoryKind::Swipe, type_id).await
    }

    pub async fn add_consumption_type(&self, draft: &CategoryDraft) -> Result<Value, StoreError> {
        self.add(CategoryKind::Consumption, draft).await
    }

    pub async fn update_consumption_type(
        &self,
        type_id: &str,
        draft: &CategoryDraft,
    ) -> Result<Value, StoreError> {
        self.update(CategoryKind::Consumption, type_id, draft).await
    }

    pub async fn delete_consumption_type(&self, type_id: &str) -> Result<Value, StoreError> {
        self.delete(CategoryKind::Consumption, type_id).await
    }

    async fn add(&self, kind: CategoryKind, draft: &CategoryDraft) -> Result<Value, StoreError> {
        let reply = self.api.add(kind, draft).await.inspect_err(|e| {
            tracing::error!(kind = kind.label(), error = %e, "Failed to add category")
        })?;
        self.reconcile(kind).await?;
        Ok(reply.payload)
    }

    async fn update(
        &self,
        kind: CategoryKind,
        type_id: &str,
        draft: &CategoryDraft,
    ) -> Result<Value, StoreError> {
        let reply = self.api.update(kind, type_id, draft).await.inspect_err(|e| {
            tracing::error!(kind = kind.label(), type_id, error = %e, "Failed to update category")
        })?;
        self.reconcile(kind).await?;
        Ok(reply.payload)
    }

    async fn delete(&self, kind: CategoryKind, type_id: &str) -> Result<Value, StoreError> {
        let reply = self.api.delete(kind, type_id).await.inspect_err(|e| {
            tracing::error!(kind = kind.label(), type_id, error = %e, "Failed to delete category")
        })?;
        self.reconcile(kind).await?;
        Ok(reply.payload)
    }

    async fn reconcile(&self, kind: CategoryKind) -> Result<(), StoreError> {
        let options = RequestOptions::default().ignoring_rate_limit();
        match kind {
            CategoryKind::Swipe => {
                self.load(kind, options, CategoryState::swipe_types_mut)
                    .await?;
            }
            CategoryKind::Consumption => {
                self.load(kind, options, CategoryState::consumption_types_mut)
                    .await?;
            }
        }
        Ok(())
    }

    fn generation(&self, kind: CategoryKind) -> &Generation {
        match kind {
            CategoryKind::Swipe => &self.swipe_generation,
            CategoryKind::Consumption => &self.consumption_generation,
        }
    }

    async fn load<T>(
        &self,
        kind: CategoryKind,
        options: RequestOptions,
        list: fn(&mut CategoryState) -> &mut Vec<T>,
    ) -> Result<Vec<T>, StoreError>
    where
        T: DeserializeOwned + Clone,
    {
        let generation = self.generation(kind);
        let ticket = generation.begin();
        self.state.update(|s| s.set_loading(kind, true));
        let _loading = loading_guard(&self.state, generation, ticket, move |s| {
            s.set_loading(kind, false)
        });

        let reply = self.api.list(kind, options).await.inspect_err(|e| {
            tracing::error!(kind = kind.label(), error = %e, "Failed to fetch categories")
        })?;
        if reply.is_empty_throttle() {
            let mut held = self.state.snapshot();
            return Ok(std::mem::take(list(&mut held)));
        }

        let items: Vec<T> = decode_list(&reply, kind.label())?;
        if generation.is_current(ticket) {
            let fresh = items.clone();
            self.state.update(|s| *list(s) = fresh);
        }
        Ok(items)
    }
}
