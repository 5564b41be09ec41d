//! Shop Model (tenant record)

use serde::{Deserialize, Serialize};

/// Shipping fee configuration, whole HKD
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShippingSettings {
    /// Subtotal at or above this ships free
    pub free_shipping_threshold: i64,
    /// Base fee for home delivery
    pub home_base_fee: i64,
    /// Base fee for locker pickup
    pub locker_base_fee: i64,
    /// Extra for home delivery to the outlying islands
    pub outlying_island_surcharge: i64,
}

impl Default for ShippingSettings {
    fn default() -> Self {
        Self {
            free_shipping_threshold: 600,
            home_base_fee: 40,
            locker_base_fee: 30,
            outlying_island_surcharge: 20,
        }
    }
}

/// Shop entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// URL slug ("/s/{slug}")
    pub slug: String,
    pub currency: String,
    /// Prefix for tenant-scoped order numbers
    pub order_prefix: String,
    /// Persisted counter backing order number allocation
    pub order_seq: i64,
    pub shipping: ShippingSettings,
    /// e.g. ["fps", "payme", "alipay"]
    pub enabled_payment_methods: Vec<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create shop payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopCreate {
    pub name: String,
    pub slug: String,
    pub currency: Option<String>,
    pub order_prefix: Option<String>,
    pub shipping: Option<ShippingSettings>,
    pub enabled_payment_methods: Option<Vec<String>>,
}

/// Update shop settings payload
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ShopSettingsUpdate {
    pub name: Option<String>,
    pub shipping: Option<ShippingSettings>,
    pub enabled_payment_methods: Option<Vec<String>>,
    pub is_active: Option<bool>,
}
