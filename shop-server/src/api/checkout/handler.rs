//! Checkout API Handlers
//!
//! 报价端点和下单落库走同一个 `pricing::compute_quote`：
//! 顾客在结账页看到的金额就是订单上最终持久化的金额。

use axum::{Json, extract::State};
use serde::Deserialize;

use shared::ApiResponse;
use shared::order::{DeliveryMethod, Region};

use crate::core::ServerState;
use crate::db::repository::ShopRepository;
use crate::pricing::{CheckoutQuote, compute_quote};
use crate::utils::{AppError, AppResult, ok};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    /// Shop reference ("shop:<id>")
    pub shop: String,
    pub subtotal: i64,
    pub delivery_method: DeliveryMethod,
    pub region: Region,
    /// Validated coupon discount from the coupon service
    #[serde(default)]
    pub discount: i64,
}

/// POST /api/checkout/quote - 结账金额预览
pub async fn quote(
    State(state): State<ServerState>,
    Json(payload): Json<QuoteRequest>,
) -> AppResult<Json<ApiResponse<CheckoutQuote>>> {
    if payload.subtotal < 0 {
        return Err(AppError::validation("subtotal cannot be negative"));
    }
    if payload.discount < 0 {
        return Err(AppError::validation("discount cannot be negative"));
    }

    let repo = ShopRepository::new(state.db.clone());
    let shop = repo
        .find_by_id(&payload.shop)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Shop {}", payload.shop)))?;

    let quote = compute_quote(
        payload.subtotal,
        payload.delivery_method,
        payload.region,
        &shop.shipping,
        payload.discount,
    );
    Ok(ok(quote))
}
