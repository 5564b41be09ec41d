//! Domain error kinds surfaced by the core
//!
//! Every core operation either returns the updated entity or fails with
//! one of these kinds. No silent coercion: an out-of-range transition is
//! rejected, never clamped to the nearest valid state. Callers translate
//! these into user-facing messages; the payload carries enough structured
//! detail (transition pair, requested vs available quantity) to build a
//! precise one.

use thiserror::Error;

use crate::order::{OrderStatus, PaymentStatus};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// 目标状态不在当前状态的允许集合中（或与当前状态相同）
    #[error("invalid status transition: {from:?} -> {to:?}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// 备注内容去除空白后为空
    #[error("note text is empty")]
    EmptyNote,

    /// 付款凭证尚未上传，无法确认/拒绝
    #[error("payment proof not uploaded (current payment status: {current:?})")]
    PaymentNotUploaded { current: PaymentStatus },

    /// 所选规格在 options 中不存在（从未存在过，区别于缺货）
    #[error("unknown variant selection: {selection}")]
    UnknownVariant { selection: String },

    /// 库存不足，整行拒绝，不做部分扣减
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },

    /// 规格 JSON 无法解析，fail closed：视为零库存而不是猜测
    #[error("malformed variant data: {reason}")]
    MalformedVariantData { reason: String },
}

impl DomainError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedVariantData {
            reason: reason.into(),
        }
    }

    pub fn unknown_variant(selection: impl Into<String>) -> Self {
        Self::UnknownVariant {
            selection: selection.into(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
