use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::watch;

use crate::api::RecordApi;
use crate::models::{Pagination, Record, RecordDraft, RecordFilters, RecordPage, RecordStats};

use super::{decode, loading_guard, Generation, Observable, StoreError};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordState {
    pub records: Vec<Record>,
    pub stats: Option<RecordStats>,
    pub recent: Option<Value>,
    pub loading: bool,
    pub pagination: Pagination,
}

impl RecordState {
    fn new(page_size: u32) -> Self {
        Self {
            records: Vec::new(),
            stats: None,
            recent: None,
            loading: false,
            pagination: Pagination::new(page_size),
        }
    }

    /// More pages remain on the backend.
    pub fn has_more(&self) -> bool {
        (self.records.len() as u64) < self.pagination.total
    }
}

/// What a fetched page does to the loaded list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    Replace,
    Append,
}

/// Paged record list, statistics and recent spending.
#[derive(Clone)]
pub struct RecordStore {
    api: RecordApi,
    state: Arc<Observable<RecordState>>,
    list_generation: Arc<Generation>,
    stats_generation: Arc<Generation>,
}

impl RecordStore {
    pub fn new(api: RecordApi, page_size: u32) -> Self {
        Self {
            api,
            state: Arc::new(Observable::new(RecordState::new(page_size.max(1)))),
            list_generation: Arc::new(Generation::default()),
            stats_generation: Arc::new(Generation::default()),
        }
    }

    pub fn state(&self) -> RecordState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<RecordState> {
        self.state.subscribe()
    }

    pub fn records(&self) -> Vec<Record> {
        self.state.read(|s| s.records.clone())
    }

    pub fn pagination(&self) -> Pagination {
        self.state.read(|s| s.pagination)
    }

    /// Fetch the current page with `filters` applied.
    pub async fn fetch_records(
        &self,
        filters: &RecordFilters,
        mode: FetchMode,
    ) -> Result<RecordPage, StoreError> {
        self.load(filters, mode, false).await
    }

    /// Append the next page, unless a fetch is in flight or everything is
    /// already loaded. Returns `None` when nothing was requested.
    pub async fn load_more_records(
        &self,
        filters: &RecordFilters,
    ) -> Result<Option<RecordPage>, StoreError> {
        let advanced = self.state.update_if(|s| {
            if s.loading || !s.has_more() {
                return false;
            }
            s.pagination.page += 1;
            true
        });
        if !advanced {
            tracing::debug!("No more records to load");
            return Ok(None);
        }
        self.load(filters, FetchMode::Append, false).await.map(Some)
    }

    /// Drop loaded records and return to page 1. Fetches still in flight
    /// are discarded when they land.
    pub fn reset_records(&self) {
        self.list_generation.begin();
        self.state.update(|s| {
            s.records.clear();
            s.loading = false;
            s.pagination.page = 1;
            s.pagination.total = 0;
        });
    }

    pub fn set_pagination(&self, page: u32, limit: u32) {
        self.state.update(|s| {
            s.pagination.page = page.max(1);
            s.pagination.limit = limit.max(1);
        });
    }

    pub async fn fetch_stats(&self, filters: &RecordFilters) -> Result<RecordStats, StoreError> {
        let ticket = self.stats_generation.begin();
        let reply = self
            .api
            .stats(crate::api::encode(filters)?)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to fetch record stats"))?;
        if reply.is_empty_throttle() {
            return Ok(self.state.read(|s| s.stats.clone()).unwrap_or_default());
        }

        let stats: RecordStats = decode(&reply, "record stats")?;
        if self.stats_generation.is_current(ticket) {
            let fresh = stats.clone();
            self.state.update(|s| s.stats = Some(fresh));
        }
        Ok(stats)
    }

    pub async fn fetch_recent_consumptions(&self) -> Result<Value, StoreError> {
        let reply = self.api.recent_consumptions().await.inspect_err(|e| {
            tracing::error!(error = %e, "Failed to fetch recent consumptions")
        })?;
        if !reply.is_empty_throttle() {
            let fresh = reply.payload.clone();
            self.state.update(|s| s.recent = Some(fresh));
        }
        Ok(reply.payload)
    }

    pub async fn add_record(&self, record: &RecordDraft) -> Result<Value, StoreError> {
        let reply = self
            .api
            .add(record)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to add record"))?;
        self.reconcile().await?;
        Ok(reply.payload)
    }

    pub async fn update_record(
        &self,
        record_id: &str,
        record: &RecordDraft,
    ) -> Result<Value, StoreError> {
        let reply = self
            .api
            .update(record_id, record)
            .await
            .inspect_err(|e| tracing::error!(record_id, error = %e, "Failed to update record"))?;
        self.reconcile().await?;
        Ok(reply.payload)
    }

    pub async fn delete_record(&self, record_id: &str) -> Result<Value, StoreError> {
        let reply = self
            .api
            .delete(record_id)
            .await
            .inspect_err(|e| tracing::error!(record_id, error = %e, "Failed to delete record"))?;
        self.reconcile().await?;
        Ok(reply.payload)
    }

    /// Back to page 1, unfiltered, past the throttle.
    async fn reconcile(&self) -> Result<RecordPage, StoreError> {
        self.state.update(|s| s.pagination.page = 1);
        self.load(&RecordFilters::default(), FetchMode::Replace, true)
            .await
    }

    fn page_params(&self, filters: &RecordFilters) -> Result<Value, StoreError> {
        let pagination = self.pagination();
        let mut params = Map::new();
        params.insert("page".to_string(), pagination.page.into());
        params.insert("page_size".to_string(), pagination.limit.into());
        if let Value::Object(filters) = crate::api::encode(filters)? {
            params.extend(filters);
        }
        Ok(Value::Object(params))
    }

    async fn load(
        &self,
        filters: &RecordFilters,
        mode: FetchMode,
        ignore_rate_limit: bool,
    ) -> Result<RecordPage, StoreError> {
        let params = self.page_params(filters)?;
        let ticket = self.list_generation.begin();
        self.state.update(|s| s.loading = true);
        let _loading = loading_guard(&self.state, &self.list_generation, ticket, |s| {
            s.loading = false
        });

        let reply = self
            .api
            .list(params, ignore_rate_limit)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to fetch records"))?;
        if reply.is_empty_throttle() {
            return Ok(RecordPage {
                list: Vec::new(),
                total: self.pagination().total,
            });
        }

        let page: RecordPage = decode(&reply, "record page")?;
        if self.list_generation.is_current(ticket) {
            let fresh = page.list.clone();
            let total = page.total;
            self.state.update(|s| {
                match mode {
                    FetchMode::Replace => s.records = fresh,
                    FetchMode::Append => s.records.extend(fresh),
                }
                s.pagination.total = total;
            });
        } else {
            tracing::debug!(ticket, "Discarding superseded record page");
        }
        Ok(page)
    }
}
