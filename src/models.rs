//! Domain entities as the backend sends them, plus the drafts used to
//! create or update them.
//!
//! Unknown fields are kept in `extra` so nothing the backend adds is lost
//! on a round trip through the client.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A credit card.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Card {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bank: String,
    /// Last four digits.
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub credit_limit: f64,
    #[serde(default)]
    pub bill_day: u8,
    #[serde(default)]
    pub payment_day: u8,
    #[serde(default)]
    pub last_payment_day: u8,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Card {
    /// Name if set, otherwise bank and last digits.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("{} ({})", self.bank, self.card_number),
        }
    }
}

/// Fields sent to `/card/add` and `/card/update/{id}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CardDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub bank: String,
    pub card_number: String,
    pub credit_limit: f64,
    pub bill_day: u8,
    pub payment_day: u8,
    pub last_payment_day: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Query for `/card/list`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CardFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    /// Backend sort expression, e.g. `{'bill_day': 1}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

/// How a card was swiped (online, POS, cash advance, ...).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SwipeType {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// What the money was spent on (food, travel, ...).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConsumptionType {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fields sent when creating or updating either category kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
}

/// Payment or repayment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RecordKind {
    #[default]
    #[serde(rename = "支付")]
    Payment,
    #[serde(rename = "还款")]
    Repayment,
}

/// Part of a repayment allocated to a payment record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RepaymentRef {
    pub repayment_id: String,
    pub amount: f64,
}

/// One card transaction.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub card_id: String,
    #[serde(default)]
    pub card_name: Option<String>,
    #[serde(default)]
    pub card_bank: Option<String>,
    #[serde(default)]
    pub card_number: Option<String>,
    #[serde(default)]
    pub swipe_type_id: Option<String>,
    #[serde(default)]
    pub swipe_type_name: Option<String>,
    #[serde(default)]
    pub consumption_type_id: Option<String>,
    #[serde(default)]
    pub consumption_type_name: Option<String>,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
    /// ISO 8601 timestamp as sent by the backend.
    #[serde(default)]
    pub trade_date: Option<String>,
    #[serde(default)]
    pub record_type: RecordKind,
    /// Repayment state: 未还 / 部分还 / 已还.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub repayment_refs: Vec<RepaymentRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fields sent to `/record/add` and `/record/update/{id}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordDraft {
    pub card_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swipe_type_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumption_type_id: Option<String>,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_date: Option<String>,
    pub record_type: RecordKind,
}

/// Query for `/record/list` and `/record/stats`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RecordFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumption_type_id: Option<String>,
    /// YYYY-MM-DD, inclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// YYYY-MM-DD, inclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// One page of `/record/list`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RecordPage {
    #[serde(default)]
    pub list: Vec<Record>,
    #[serde(default)]
    pub total: u64,
}

/// Spending for one consumption type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryStat {
    #[serde(default)]
    pub consumption_type_id: Option<String>,
    #[serde(default)]
    pub consumption_type_name: String,
    #[serde(default)]
    pub consumption_type_color: Option<String>,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub count: u64,
}

/// Result of `/record/stats`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordStats {
    #[serde(default)]
    pub stats: Vec<CategoryStat>,
    #[serde(default)]
    pub total_amount: f64,
}

/// The logged-in user.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mobile: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Client-side paging cursor for the record list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based.
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

impl Pagination {
    pub fn new(limit: u32) -> Self {
        Self {
            page: 1,
            limit,
            total: 0,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(20)
    }
}

fn default_true() -> bool {
    true
}
