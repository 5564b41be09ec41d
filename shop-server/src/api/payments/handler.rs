//! Payment webhook handler
//!
//! 支付网关回调只负责落一条 PaymentAttempt 记录；
//! 订单本身的付款确认走人工凭证流程，互不干涉。

use axum::{Json, extract::State};
use serde::Deserialize;

use shared::ApiResponse;
use shared::models::{PaymentAttempt, PaymentAttemptStatus};
use shared::util::now_millis;

use crate::core::ServerState;
use crate::db::repository::PaymentAttemptRepository;
use crate::utils::{AppError, AppResult, ok};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    /// Order reference ("shop_order:<id>")
    pub order: String,
    pub provider: String,
    pub status: PaymentAttemptStatus,
    pub amount: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub provider_ref: Option<String>,
    #[serde(default)]
    pub failure_code: Option<String>,
    #[serde(default)]
    pub failure_message: Option<String>,
}

fn default_currency() -> String {
    "HKD".to_string()
}

/// POST /api/payments/webhook - 支付网关回调落库
pub async fn webhook(
    State(state): State<ServerState>,
    Json(payload): Json<WebhookPayload>,
) -> AppResult<Json<ApiResponse<PaymentAttempt>>> {
    // 确认订单存在再落库，脏回调直接拒绝
    state
        .orders
        .get(&payload.order)
        .await
        .map_err(|_| AppError::not_found(format!("Order {}", payload.order)))?;

    let repo = PaymentAttemptRepository::new(state.db.clone());
    let attempt = repo
        .create(PaymentAttempt {
            id: None,
            order: payload.order,
            provider: payload.provider,
            status: payload.status,
            amount: payload.amount,
            currency: payload.currency,
            provider_ref: payload.provider_ref,
            failure_code: payload.failure_code,
            failure_message: payload.failure_message,
            created_at: now_millis(),
        })
        .await?;
    Ok(ok(attempt))
}
