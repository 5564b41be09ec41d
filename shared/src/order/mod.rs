//! Order domain module
//!
//! This module owns the order record and its lifecycle state machine:
//! - Status: the single tagged status enum (modern + legacy vocabularies)
//!   and its transition table
//! - Types: line items, append-only history/notes sequences, transition
//!   context
//! - Record: the [`Order`] entity and its mutation methods (the only
//!   paths that touch status, history and lifecycle timestamps)

mod record;
mod status;
mod types;


pub use record::{Order, OrderAmounts};
pub use status::{OrderStatus, PaymentStatus};
pub use types::{
    AdminNote, AdminNotes, DeliveryMethod, OrderItem, Region, StatusChange, StatusHistory,
    TransitionContext,
};
