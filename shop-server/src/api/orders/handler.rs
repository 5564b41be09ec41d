//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use validator::Validate;

use shared::ApiResponse;
use shared::models::PaymentAttempt;
use shared::order::{Order, OrderStatus, TransitionContext};

use crate::core::ServerState;
use crate::db::repository::PaymentAttemptRepository;
use crate::orders::CreateOrderRequest;
use crate::utils::{AppError, AppResult, ok};

/// POST /api/orders - 结账下单
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let order = state.orders.create_order(payload).await?;
    Ok(ok(order))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub shop: Option<String>,
    pub status: Option<OrderStatus>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

fn default_limit() -> u32 {
    50
}

/// GET /api/orders - 订单列表 (店铺/状态过滤，新单在前)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let orders = state
        .orders
        .list(query.shop.as_deref(), query.status, query.limit, query.offset)
        .await?;
    Ok(ok(orders))
}

/// GET /api/orders/:id - 订单详情
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state.orders.get(&id).await?;
    Ok(ok(order))
}

/// Admin action payload for PATCH /api/orders/:id
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum OrderAction {
    /// 状态流转，可携带目标状态相关的上下文字段
    #[serde(rename_all = "camelCase")]
    Transition {
        status: OrderStatus,
        #[serde(default)]
        tracking_number: Option<String>,
        #[serde(default)]
        cancel_reason: Option<String>,
        #[serde(default)]
        refund_reason: Option<String>,
    },
    /// 人工确认已上传的付款凭证
    #[serde(rename_all = "camelCase")]
    ConfirmPayment { confirmed_by: String },
    /// 拒绝已上传的付款凭证
    #[serde(rename_all = "camelCase")]
    RejectPayment {
        #[serde(default)]
        reason: Option<String>,
        rejected_by: String,
    },
}

/// PATCH /api/orders/:id - 订单动作（流转 / 确认付款 / 拒绝付款）
pub async fn apply_action(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(action): Json<OrderAction>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = match action {
        OrderAction::Transition {
            status,
            tracking_number,
            cancel_reason,
            refund_reason,
        } => {
            let ctx = TransitionContext {
                tracking_number,
                cancel_reason,
                refund_reason,
            };
            let outcome = state.orders.request_transition(&id, status, ctx).await?;
            // 进入 CANCELLED/REFUNDED 后把已占用的库存还回去
            if !outcome.restock_lines.is_empty() {
                state.inventory.restock_lines(&outcome.restock_lines).await;
            }
            outcome.order
        }
        OrderAction::ConfirmPayment { confirmed_by } => {
            state.orders.confirm_payment(&id, &confirmed_by).await?
        }
        OrderAction::RejectPayment {
            reason,
            rejected_by,
        } => {
            state
                .orders
                .reject_payment(&id, reason.as_deref(), &rejected_by)
                .await?
        }
    };
    Ok(ok(order))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRequest {
    pub note: String,
    pub author: String,
}

/// POST /api/orders/:id/notes - 追加管理员备注
pub async fn add_note(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<NoteRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state
        .orders
        .add_note(&id, &payload.note, &payload.author)
        .await?;
    Ok(ok(order))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentProofRequest {
    #[validate(url(message = "proofUrl must be a valid URL"))]
    pub proof_url: String,
}

/// POST /api/orders/:id/payment-proof - 上传付款凭证
pub async fn upload_payment_proof(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<PaymentProofRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let order = state
        .orders
        .upload_payment_proof(&id, &payload.proof_url)
        .await?;
    Ok(ok(order))
}

/// GET /api/orders/:id/payment-attempts - 支付尝试记录 (新的在前)
pub async fn list_payment_attempts(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<PaymentAttempt>>>> {
    // 先确认订单存在，避免对任意 id 返回空列表
    let order = state.orders.get(&id).await?;
    let repo = PaymentAttemptRepository::new(state.db.clone());
    let attempts = repo.find_for_order(order.id.as_deref().unwrap_or(&id)).await?;
    Ok(ok(attempts))
}
