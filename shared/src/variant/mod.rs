//! Product variant and stock model
//!
//! Three physically different persisted JSON shapes must keep working:
//!
//! 1. Legacy flat map: `{ "M": 3, "L": 0 }`
//! 2. Single-dimension structured: `{ "M": { "qty": 3, "status": "available" } }`
//!    with `sizeSystem` naming the axis ("Size", "Color", ...)
//! 3. Dual-dimension: `{ "dimensions": ["Color", "Size"],
//!    "options": { "Color": ["Red"], "Size": ["M"] },
//!    "combinations": { "Red|M": { "qty": 3, "status": "available" } } }`
//!
//! All three are normalized into [`VariantData`] immediately on read, so
//! availability, decrement and stock summation operate on one canonical
//! shape; only [`VariantData::to_persisted`] knows about the on-disk
//! forms (and always emits the structured ones).
//!
//! Parsing fails closed: unparseable `sizes` is [`DomainError::MalformedVariantData`],
//! callers treat the product as having zero stock rather than guessing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DomainError;


/// Separator inside dual-dimension combination keys ("Red|M")
pub const COMBO_SEPARATOR: char = '|';

const DEFAULT_DIMENSION: &str = "Size";
const STATUS_AVAILABLE: &str = "available";

/// Variant structure of a product
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VariantMode {
    /// 单一 SKU，无规格
    #[default]
    None,
    /// 单维规格（尺码或颜色等一个轴）
    Single,
    /// 双维规格（颜色 × 尺码），按组合计库存
    Dual,
}

/// Stock bookkeeping for one variant key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockEntry {
    pub qty: i64,
    /// Free-form status string; legacy data carries values beyond
    /// "available", they round-trip untouched
    pub status: String,
}

impl StockEntry {
    fn available(qty: i64) -> Self {
        Self {
            qty,
            status: STATUS_AVAILABLE.to_string(),
        }
    }
}

/// Canonical in-memory variant structure
///
/// `stock` keys are the bare variant name in single mode and
/// `"<dim1Value>|<dim2Value>"` in dual mode. Keys whose values are no
/// longer present in the option lists (stale combinations) are kept:
/// they count toward total stock and round-trip, but selections are
/// validated against the option lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct VariantData {
    pub mode: VariantMode,
    /// First (or only) dimension name
    pub dimension1: String,
    /// Option values along the first dimension, in display order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values1: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension2: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values2: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub stock: BTreeMap<String, StockEntry>,
}

/// Combination key for a dual-dimension selection
pub fn combo_key(v1: &str, v2: &str) -> String {
    format!("{v1}{COMBO_SEPARATOR}{v2}")
}

/// Parse persisted `sizes` JSON of unknown shape into the canonical form
///
/// `size_system` is the stored axis-name hint for the single-dimension
/// shapes; dual-dimension data names its own axes.
pub fn parse_variant_data(raw: &Value, size_system: Option<&str>) -> Result<VariantData, DomainError> {
    let map = match raw {
        Value::Null => return Ok(VariantData::default()),
        Value::Object(map) => map,
        other => {
            return Err(DomainError::malformed(format!(
                "sizes must be an object, got {}",
                json_type_name(other)
            )));
        }
    };
    if map.is_empty() {
        return Ok(VariantData::default());
    }

    if map.contains_key("dimensions") {
        return parse_dual(map);
    }
    parse_single(map, size_system)
}

fn parse_single(
    map: &serde_json::Map<String, Value>,
    size_system: Option<&str>,
) -> Result<VariantData, DomainError> {
    let mut values1 = Vec::with_capacity(map.len());
    let mut stock = BTreeMap::new();

    for (name, value) in map {
        let entry = parse_stock_entry(name, value)?;
        values1.push(name.clone());
        stock.insert(name.clone(), entry);
    }

    Ok(VariantData {
        mode: VariantMode::Single,
        dimension1: size_system.unwrap_or(DEFAULT_DIMENSION).to_string(),
        values1,
        dimension2: None,
        values2: Vec::new(),
        stock,
    })
}

fn parse_dual(map: &serde_json::Map<String, Value>) -> Result<VariantData, DomainError> {
    let dimensions = map
        .get("dimensions")
        .and_then(Value::as_array)
        .ok_or_else(|| DomainError::malformed("dimensions must be an array"))?;
    let [dim1, dim2] = dimensions.as_slice() else {
        return Err(DomainError::malformed(
            "dimensions must name exactly two axes",
        ));
    };
    let dim1 = dim1
        .as_str()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| DomainError::malformed("dimension names must be non-empty strings"))?;
    let dim2 = dim2
        .as_str()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| DomainError::malformed("dimension names must be non-empty strings"))?;

    let options = map
        .get("options")
        .and_then(Value::as_object)
        .ok_or_else(|| DomainError::malformed("options must be an object"))?;
    let values1 = parse_option_values(options, dim1)?;
    let values2 = parse_option_values(options, dim2)?;

    let mut stock = BTreeMap::new();
    if let Some(combinations) = map.get("combinations") {
        let combinations = combinations
            .as_object()
            .ok_or_else(|| DomainError::malformed("combinations must be an object"))?;
        for (key, value) in combinations {
            if !key.contains(COMBO_SEPARATOR) {
                return Err(DomainError::malformed(format!(
                    "combination key '{key}' is missing the '|' separator"
                )));
            }
            stock.insert(key.clone(), parse_stock_entry(key, value)?);
        }
    }

    // 缺失的组合按 0 库存补齐：options 中出现的每一对 (v1, v2) 都必须有条目
    for v1 in &values1 {
        for v2 in &values2 {
            stock
                .entry(combo_key(v1, v2))
                .or_insert_with(|| StockEntry::available(0));
        }
    }

    Ok(VariantData {
        mode: VariantMode::Dual,
        dimension1: dim1.to_string(),
        values1,
        dimension2: Some(dim2.to_string()),
        values2,
        stock,
    })
}

fn parse_option_values(
    options: &serde_json::Map<String, Value>,
    dimension: &str,
) -> Result<Vec<String>, DomainError> {
    let values = options
        .get(dimension)
        .and_then(Value::as_array)
        .ok_or_else(|| {
            DomainError::malformed(format!("options is missing values for dimension '{dimension}'"))
        })?;
    values
        .iter()
        .map(|v| {
            v.as_str()
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .ok_or_else(|| {
                    DomainError::malformed(format!(
                        "option values for '{dimension}' must be non-empty strings"
                    ))
                })
        })
        .collect()
}

/// One stock value: either a bare integer (legacy flat shape) or an
/// object carrying `qty` and an optional `status`
fn parse_stock_entry(key: &str, value: &Value) -> Result<StockEntry, DomainError> {
    match value {
        Value::Number(_) => {
            let qty = value
                .as_i64()
                .filter(|q| *q >= 0)
                .ok_or_else(|| {
                    DomainError::malformed(format!(
                        "quantity for '{key}' must be a non-negative integer"
                    ))
                })?;
            Ok(StockEntry::available(qty))
        }
        Value::Object(obj) => {
            let qty = obj
                .get("qty")
                .and_then(Value::as_i64)
                .filter(|q| *q >= 0)
                .ok_or_else(|| {
                    DomainError::malformed(format!(
                        "quantity for '{key}' must be a non-negative integer"
                    ))
                })?;
            let status = match obj.get("status") {
                None => STATUS_AVAILABLE.to_string(),
                Some(Value::String(s)) => s.clone(),
                Some(_) => {
                    return Err(DomainError::malformed(format!(
                        "status for '{key}' must be a string"
                    )));
                }
            };
            Ok(StockEntry { qty, status })
        }
        other => Err(DomainError::malformed(format!(
            "stock value for '{key}' must be an integer or object, got {}",
            json_type_name(other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl VariantData {
    /// Serialize back to the persisted `sizes` shape
    ///
    /// Always emits the structured forms (shape 2 for single, shape 3
    /// for dual); the legacy flat map is read-only compatibility.
    pub fn to_persisted(&self) -> Value {
        match self.mode {
            VariantMode::None => Value::Null,
            VariantMode::Single => {
                let mut map = serde_json::Map::new();
                for name in &self.values1 {
                    let entry = self
                        .stock
                        .get(name)
                        .cloned()
                        .unwrap_or_else(|| StockEntry::available(0));
                    map.insert(name.clone(), stock_entry_json(&entry));
                }
                // 不在 values1 里的旧键一并落盘，避免数据悄悄丢失
                for (key, entry) in &self.stock {
                    if !map.contains_key(key) {
                        map.insert(key.clone(), stock_entry_json(entry));
                    }
                }
                Value::Object(map)
            }
            VariantMode::Dual => {
                let dim2 = self.dimension2.as_deref().unwrap_or_default();

                let mut options = serde_json::Map::new();
                options.insert(
                    self.dimension1.clone(),
                    serde_json::to_value(&self.values1).unwrap_or(Value::Null),
                );
                options.insert(
                    dim2.to_string(),
                    serde_json::to_value(&self.values2).unwrap_or(Value::Null),
                );

                let mut combinations = serde_json::Map::new();
                for (key, entry) in &self.stock {
                    combinations.insert(key.clone(), stock_entry_json(entry));
                }

                let mut map = serde_json::Map::new();
                map.insert(
                    "dimensions".to_string(),
                    serde_json::json!([self.dimension1, dim2]),
                );
                map.insert("options".to_string(), Value::Object(options));
                map.insert("combinations".to_string(), Value::Object(combinations));
                Value::Object(map)
            }
        }
    }

    /// Total stock across all keys, stale entries included
    pub fn total_stock(&self) -> i64 {
        self.stock.values().map(|e| e.qty).sum()
    }

    /// Remaining quantity for a selection
    ///
    /// Absence from the stock map means out of stock (0), not an error.
    /// A selection naming a value that was never in the option lists is
    /// [`DomainError::UnknownVariant`].
    pub fn availability(&self, selection: &str) -> Result<i64, DomainError> {
        self.validate_selection(selection)?;
        Ok(self.stock.get(selection).map(|e| e.qty).unwrap_or(0))
    }

    /// Atomically-checked decrement used at order placement
    ///
    /// The whole line is rejected when stock is short: no partial
    /// decrement, quantities never go negative.
    pub fn decrement(&mut self, selection: &str, quantity: i64) -> Result<(), DomainError> {
        let available = self.availability(selection)?;
        if available < quantity {
            return Err(DomainError::InsufficientStock {
                requested: quantity,
                available,
            });
        }
        self.stock
            .entry(selection.to_string())
            .or_insert_with(|| StockEntry::available(0))
            .qty -= quantity;
        Ok(())
    }

    /// Return quantity on cancellation/refund
    ///
    /// Always succeeds, with no upper bound: returned merchandise may
    /// legitimately exceed what was tracked as sold if stock was
    /// adjusted manually in between. Stale keys are accepted so orders
    /// can restock variants that were since removed from the options.
    pub fn restock(&mut self, selection: &str, quantity: i64) {
        self.stock
            .entry(selection.to_string())
            .or_insert_with(|| StockEntry::available(0))
            .qty += quantity;
    }

    fn validate_selection(&self, selection: &str) -> Result<(), DomainError> {
        match self.mode {
            VariantMode::None => Err(DomainError::unknown_variant(selection)),
            VariantMode::Single => {
                if self.values1.iter().any(|v| v == selection) {
                    Ok(())
                } else {
                    Err(DomainError::unknown_variant(selection))
                }
            }
            VariantMode::Dual => {
                let Some((v1, v2)) = selection.split_once(COMBO_SEPARATOR) else {
                    return Err(DomainError::unknown_variant(selection));
                };
                if self.values1.iter().any(|v| v == v1) && self.values2.iter().any(|v| v == v2) {
                    Ok(())
                } else {
                    Err(DomainError::unknown_variant(selection))
                }
            }
        }
    }
}

fn stock_entry_json(entry: &StockEntry) -> Value {
    serde_json::json!({ "qty": entry.qty, "status": entry.status })
}
