//! Payment Attempt Model
//!
//! Read-mostly records created by the payment-provider webhook. An order
//! may have zero, one or many attempts; the "last payment status" shown
//! to admins is the first attempt under descending creation time.

use serde::{Deserialize, Serialize};

/// Provider-side attempt status, stored in the provider's own lowercase
/// vocabulary
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentAttemptStatus {
    Succeeded,
    Processing,
    RequiresAction,
    Failed,
    Cancelled,
}

/// Payment attempt entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAttempt {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Order reference ("shop_order:<id>")
    pub order: String,
    /// Provider name as reported ("stripe", "payme", ...)
    pub provider: String,
    pub status: PaymentAttemptStatus,
    /// Amount in whole HKD
    pub amount: i64,
    pub currency: String,
    /// Provider-side correlation id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_message: Option<String>,
    pub created_at: i64,
}
