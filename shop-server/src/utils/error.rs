//! 统一错误处理
//!
//! 提供应用级错误类型 [`AppError`]，实现 `IntoResponse`，
//! 统一序列化为 [`shared::ApiResponse`] 信封。
//!
//! # 错误码规范
//!
//! | 前缀 | 分类 | 示例 |
//! |------|------|------|
//! | E0xxx | 通用错误 | E0003 资源不存在 |
//! | E4xxx | 订单错误 | E4001 非法状态流转 |
//! | E5xxx | 付款错误 | E5001 凭证未上传 |
//! | E6xxx | 商品/库存错误 | E6002 库存不足 |
//! | E9xxx | 系统错误 | E9002 数据库错误 |
//!
//! 领域错误携带结构化 detail（流转的 from/to、请求量与可用量），
//! 由调用方组装面向用户的文案；核心不生成用户可见文本。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

use shared::error::DomainError;
use shared::response::ApiResponse;

/// 应用错误枚举
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== 业务逻辑错误 (4xx) ==========
    #[error("Resource not found: {0}")]
    /// 资源不存在 (404)
    NotFound(String),

    #[error("Conflict: {0}")]
    /// 并发冲突 / 资源冲突 (409)
    Conflict(String),

    #[error("Validation failed: {0}")]
    /// 验证失败 (400)
    Validation(String),

    #[error("Business rule violation: {0}")]
    /// 业务规则违反 (422)
    BusinessRule(String),

    #[error(transparent)]
    /// 核心领域错误，携带结构化 detail
    Domain(#[from] DomainError),

    // ========== 系统错误 (5xx) ==========
    #[error("Database error: {0}")]
    /// 数据库错误 (500)
    Database(String),

    #[error("Internal server error: {0}")]
    /// 内部错误 (500)
    Internal(String),

    #[error("Invalid request: {0}")]
    /// 无效请求 (400)
    Invalid(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn business_rule(msg: impl Into<String>) -> Self {
        Self::BusinessRule(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// 领域错误 → (HTTP 状态, 错误码, detail)
fn classify_domain_error(err: &DomainError) -> (StatusCode, &'static str, serde_json::Value) {
    match err {
        DomainError::InvalidTransition { from, to } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "E4001",
            json!({ "from": from, "to": to }),
        ),
        DomainError::EmptyNote => (StatusCode::BAD_REQUEST, "E4002", serde_json::Value::Null),
        DomainError::PaymentNotUploaded { current } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "E5001",
            json!({ "current": current }),
        ),
        DomainError::UnknownVariant { selection } => (
            StatusCode::BAD_REQUEST,
            "E6001",
            json!({ "selection": selection }),
        ),
        DomainError::InsufficientStock {
            requested,
            available,
        } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "E6002",
            json!({ "requested": requested, "available": available }),
        ),
        DomainError::MalformedVariantData { reason } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "E6003",
            json!({ "reason": reason }),
        ),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, detail, trace_id) = match &self {
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                "E0003",
                msg.clone(),
                serde_json::Value::Null,
                None,
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                "E0004",
                msg.clone(),
                serde_json::Value::Null,
                None,
            ),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "E0002",
                msg.clone(),
                serde_json::Value::Null,
                None,
            ),
            AppError::BusinessRule(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "E0005",
                msg.clone(),
                serde_json::Value::Null,
                None,
            ),
            AppError::Domain(err) => {
                let (status, code, detail) = classify_domain_error(err);
                (status, code, err.to_string(), detail, None)
            }
            AppError::Database(msg) => {
                let trace_id = uuid::Uuid::new_v4().to_string();
                error!(target: "database", error = %msg, trace_id = %trace_id, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9002",
                    "Database error".to_string(),
                    serde_json::Value::Null,
                    Some(trace_id),
                )
            }
            AppError::Internal(msg) => {
                let trace_id = uuid::Uuid::new_v4().to_string();
                error!(target: "internal", error = %msg, trace_id = %trace_id, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error".to_string(),
                    serde_json::Value::Null,
                    Some(trace_id),
                )
            }
            AppError::Invalid(msg) => (
                StatusCode::BAD_REQUEST,
                "E0006",
                msg.clone(),
                serde_json::Value::Null,
                None,
            ),
        };

        let mut body = if detail.is_null() {
            ApiResponse::<serde_json::Value>::error(code, message)
        } else {
            ApiResponse::error_with_data(code, message, detail)
        };
        if let Some(trace_id) = trace_id {
            body = body.with_trace_id(trace_id);
        }

        (status, Json(body)).into_response()
    }
}

impl From<crate::db::repository::RepoError> for AppError {
    fn from(err: crate::db::repository::RepoError) -> Self {
        use crate::db::repository::RepoError;
        match err {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Conflict(msg) => AppError::Conflict(msg),
            RepoError::Database(msg) => AppError::Database(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
        }
    }
}

/// Result type for API handlers
pub type AppResult<T> = Result<T, AppError>;

/// Create a successful response envelope
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::ok(data))
}
