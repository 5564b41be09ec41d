//! Order record and lifecycle mutations
//!
//! All mutations are pure methods on [`Order`]: they either succeed and
//! leave the record in the next valid state, or fail with a
//! [`DomainError`] and leave the record untouched. Persistence (and the
//! compare-and-swap discipline that serializes concurrent transitions)
//! lives in the server's repository layer.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

use super::status::{OrderStatus, PaymentStatus};
use super::types::{
    AdminNote, AdminNotes, DeliveryMethod, OrderItem, Region, StatusChange, StatusHistory,
    TransitionContext,
};

/// Order amounts, computed once at creation time and immutable afterward.
/// Whole HKD, no minor units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderAmounts {
    pub subtotal: i64,
    pub discount: i64,
    pub delivery_fee: i64,
    pub total: i64,
    pub currency: String,
}

/// Order entity
///
/// Field names are part of the boundary contract; collaborators
/// (storefront, CMS, CSV export) read the persisted shape directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Record id ("shop_order:<id>"), absent before first persist
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Owning shop ("shop:<id>")
    pub shop: String,
    /// Human-readable, tenant-scoped order number
    pub order_number: String,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub amounts: OrderAmounts,

    pub delivery_method: DeliveryMethod,
    pub region: Region,
    pub customer_name: String,
    pub customer_contact: String,

    pub payment_method: String,
    pub payment_status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_proof: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_confirmed_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_confirmed_by: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_reason: Option<String>,

    #[serde(default)]
    pub status_history: StatusHistory,
    #[serde(default)]
    pub admin_notes: AdminNotes,

    // 生命周期时间戳：首次进入该状态时写入一次，之后不再清除或覆盖
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fulfilling_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipped_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refunded_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disputed_at: Option<i64>,

    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// Create a fresh order at PENDING with empty history
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        shop: String,
        order_number: String,
        items: Vec<OrderItem>,
        amounts: OrderAmounts,
        delivery_method: DeliveryMethod,
        region: Region,
        customer_name: String,
        customer_contact: String,
        payment_method: String,
        now: i64,
    ) -> Self {
        Self {
            id: None,
            shop,
            order_number,
            status: OrderStatus::Pending,
            items,
            amounts,
            delivery_method,
            region,
            customer_name,
            customer_contact,
            payment_method,
            payment_status: PaymentStatus::Pending,
            payment_proof: None,
            payment_confirmed_at: None,
            payment_confirmed_by: None,
            tracking_number: None,
            cancel_reason: None,
            refund_reason: None,
            status_history: StatusHistory::new(),
            admin_notes: AdminNotes::new(),
            paid_at: None,
            fulfilling_at: None,
            shipped_at: None,
            completed_at: None,
            cancelled_at: None,
            refunded_at: None,
            disputed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Request a transition to `target`
    ///
    /// Validates the edge against the transition table, appends the
    /// history entry, writes the set-once lifecycle timestamp and stores
    /// applicable context fields. Requesting the current status is
    /// rejected (nothing to update). On failure the record is unchanged:
    /// no partial mutation, no history entry.
    pub fn apply_transition(
        &mut self,
        target: OrderStatus,
        ctx: &TransitionContext,
        now: i64,
    ) -> Result<(), DomainError> {
        if target == self.status || !self.status.can_transition_to(target) {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to: target,
            });
        }

        match target {
            OrderStatus::Shipped => {
                if let Some(tracking) = &ctx.tracking_number {
                    self.tracking_number = Some(tracking.clone());
                }
            }
            OrderStatus::Cancelled => {
                if let Some(reason) = &ctx.cancel_reason {
                    self.cancel_reason = Some(reason.clone());
                }
            }
            OrderStatus::Refunded => {
                if let Some(reason) = &ctx.refund_reason {
                    self.refund_reason = Some(reason.clone());
                }
            }
            _ => {}
        }

        self.enter_status(target, now);
        Ok(())
    }

    /// Append an admin note
    pub fn add_note(
        &mut self,
        note: impl Into<String>,
        author: impl Into<String>,
        now: i64,
    ) -> Result<(), DomainError> {
        let note = note.into();
        if note.trim().is_empty() {
            return Err(DomainError::EmptyNote);
        }
        self.admin_notes.append(AdminNote {
            timestamp: now,
            note,
            author: author.into(),
        });
        self.updated_at = now;
        Ok(())
    }

    /// Attach an uploaded payment proof URL (pending/rejected → uploaded)
    ///
    /// Re-upload after a rejection is allowed; replacing a pending upload
    /// is allowed. Returns false when the payment is already confirmed.
    pub fn attach_payment_proof(&mut self, proof_url: impl Into<String>, now: i64) -> bool {
        if self.payment_status == PaymentStatus::Confirmed {
            return false;
        }
        self.payment_proof = Some(proof_url.into());
        self.payment_status = PaymentStatus::Uploaded;
        self.updated_at = now;
        true
    }

    /// Confirm an uploaded payment proof and enter PAID
    ///
    /// Valid only while `payment_status == uploaded` and the order has
    /// not moved past the pre-payment states. PAID has no inbound edge
    /// in the transition table; manual confirmation is its entry point,
    /// routed through the same history/timestamp machinery.
    pub fn confirm_payment(
        &mut self,
        confirmed_by: impl Into<String>,
        now: i64,
    ) -> Result<(), DomainError> {
        if self.payment_status != PaymentStatus::Uploaded {
            return Err(DomainError::PaymentNotUploaded {
                current: self.payment_status,
            });
        }
        if !matches!(self.status, OrderStatus::Pending | OrderStatus::Confirmed) {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to: OrderStatus::Paid,
            });
        }
        self.payment_status = PaymentStatus::Confirmed;
        self.payment_confirmed_at = Some(now);
        self.payment_confirmed_by = Some(confirmed_by.into());
        self.enter_status(OrderStatus::Paid, now);
        Ok(())
    }

    /// Reject an uploaded payment proof
    pub fn reject_payment(&mut self, now: i64) -> Result<(), DomainError> {
        if self.payment_status != PaymentStatus::Uploaded {
            return Err(DomainError::PaymentNotUploaded {
                current: self.payment_status,
            });
        }
        self.payment_status = PaymentStatus::Rejected;
        self.updated_at = now;
        Ok(())
    }

    /// Record the status change: history append, set-once timestamp,
    /// status swap. Callers must have validated the edge.
    fn enter_status(&mut self, target: OrderStatus, now: i64) {
        self.status_history.append(StatusChange {
            from_status: self.status,
            to_status: target,
            timestamp: now,
        });

        let slot = match target {
            OrderStatus::Paid => Some(&mut self.paid_at),
            OrderStatus::Fulfilling => Some(&mut self.fulfilling_at),
            OrderStatus::Shipped => Some(&mut self.shipped_at),
            OrderStatus::Completed => Some(&mut self.completed_at),
            OrderStatus::Cancelled => Some(&mut self.cancelled_at),
            OrderStatus::Refunded => Some(&mut self.refunded_at),
            OrderStatus::Disputed => Some(&mut self.disputed_at),
            _ => None,
        };
        if let Some(slot) = slot
            && slot.is_none()
        {
            *slot = Some(now);
        }

        self.status = target;
        self.updated_at = now;
    }
}
