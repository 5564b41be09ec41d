//! Order status state machine
//!
//! Two overlapping status vocabularies coexist historically: the modern
//! flow (PENDING → CONFIRMED → PROCESSING → SHIPPED → DELIVERED →
//! COMPLETED) and the legacy flow (PAID → FULFILLING → SHIPPED, plus
//! DISPUTED). Historical data cannot be migrated away, so both live in a
//! single tagged enum and the transition table is the union of both edge
//! sets.

use serde::{Deserialize, Serialize};

/// Order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    // 现行流程
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Completed,
    Cancelled,
    Refunded,
    Abandoned,
    // 历史流程
    Paid,
    Fulfilling,
    Disputed,
}

impl OrderStatus {
    /// All states, for exhaustive sweeps
    pub const ALL: [OrderStatus; 12] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
        OrderStatus::Refunded,
        OrderStatus::Abandoned,
        OrderStatus::Paid,
        OrderStatus::Fulfilling,
        OrderStatus::Disputed,
    ];

    /// Allowed destination set for this status
    pub fn allowed_targets(&self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            Pending => &[Confirmed, Cancelled],
            Confirmed => &[Processing, Cancelled],
            Processing => &[Shipped, Cancelled],
            Shipped => &[Delivered],
            Delivered => &[Completed, Refunded],
            Completed => &[Refunded],
            Cancelled => &[],
            Refunded => &[],
            Abandoned => &[Pending],
            Paid => &[Fulfilling, Confirmed, Cancelled, Refunded, Disputed],
            Fulfilling => &[Shipped, Processing, Cancelled],
            Disputed => &[],
        }
    }

    /// Whether `target` is reachable from this status in one step
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        self.allowed_targets().contains(&target)
    }

    /// Terminal states have no outgoing edges
    pub fn is_terminal(&self) -> bool {
        self.allowed_targets().is_empty()
    }

    /// Entering this status returns committed stock to inventory
    pub fn triggers_restock(&self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Refunded)
    }
}

/// Payment status for the manual local payment proof flow
/// (FPS / PayMe / Alipay 转数快截图人工核对)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Uploaded,
    Confirmed,
    Rejected,
}
