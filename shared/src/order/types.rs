//! Order value types
//!
//! `StatusHistory` and `AdminNotes` are true ordered-sequence types:
//! `append` is the only mutation path, there is no splice or rewrite.

use serde::{Deserialize, Serialize};

use super::status::OrderStatus;

/// Order line item
///
/// `unit_price` is captured at purchase time and stays fixed no matter
/// how the product price changes later.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Product reference ("product:<id>")
    pub product: String,
    /// Product name at purchase time
    pub name: String,
    /// Chosen variant key ("M" or "Red|M"), none for single-SKU products
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_key: Option<String>,
    /// Unit price in whole HKD
    pub unit_price: i64,
    pub quantity: i32,
}

impl OrderItem {
    pub fn line_total(&self) -> i64 {
        self.unit_price * self.quantity as i64
    }
}

/// One entry of the status history log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub from_status: OrderStatus,
    pub to_status: OrderStatus,
    /// Unix millis
    pub timestamp: i64,
}

/// Append-only status history
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct StatusHistory(Vec<StatusChange>);

impl StatusHistory {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn append(&mut self, change: StatusChange) {
        self.0.push(change);
    }

    pub fn entries(&self) -> &[StatusChange] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&StatusChange> {
        self.0.last()
    }
}

/// One admin note
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminNote {
    /// Unix millis
    pub timestamp: i64,
    pub note: String,
    pub author: String,
}

/// Append-only admin note log
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct AdminNotes(Vec<AdminNote>);

impl AdminNotes {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn append(&mut self, note: AdminNote) {
        self.0.push(note);
    }

    pub fn entries(&self) -> &[AdminNote] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Optional context supplied with a transition request
///
/// Each field is stored only when the target status makes it applicable:
/// tracking number for SHIPPED, cancel reason for CANCELLED, refund
/// reason for REFUNDED. Irrelevant fields are ignored, not persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionContext {
    pub tracking_number: Option<String>,
    pub cancel_reason: Option<String>,
    pub refund_reason: Option<String>,
}

/// Delivery method offered at checkout
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    /// 上門派送
    Home,
    /// 智能櫃自取
    Locker,
}

/// Hong Kong delivery regions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    HongKongIsland,
    Kowloon,
    NewTerritories,
    /// 离岛上门派送收取附加费
    OutlyingIslands,
}

impl Region {
    pub fn is_outlying_islands(&self) -> bool {
        matches!(self, Region::OutlyingIslands)
    }
}
