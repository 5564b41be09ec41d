//! Shared types for the Shoplink platform
//!
//! Common types used by every surface: record models, the order status
//! state machine, the canonical variant/stock model, domain errors and
//! the unified API response structure.

pub mod error;
pub mod models;
pub mod order;
pub mod response;
pub mod util;
pub mod variant;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::DomainError;
pub use order::{Order, OrderStatus, PaymentStatus, TransitionContext};
pub use response::ApiResponse;
pub use variant::{VariantData, VariantMode};
