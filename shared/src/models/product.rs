//! Product Model

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Product entity
///
/// `sizes` holds the variant/stock JSON in one of the persisted shapes;
/// read it through `variant::parse_variant_data`, never directly.
/// `stock_version` is bumped on every stock write and backs the
/// compare-and-swap discipline that keeps concurrent checkouts from
/// overselling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Owning shop ("shop:<id>")
    pub shop: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Unit price in whole HKD
    pub price: i64,
    /// Variant/stock JSON (legacy flat, single structured, or dual)
    #[serde(default)]
    pub sizes: Value,
    /// Axis-name hint for the single-dimension shapes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_system: Option<String>,
    /// Monotonic counter for atomic stock updates
    #[serde(default)]
    pub stock_version: i64,
    #[serde(default)]
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub shop: String,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub sizes: Option<Value>,
    pub size_system: Option<String>,
    pub sort_order: Option<i32>,
}

/// Update product payload
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub size_system: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}
