//! Record models shared across surfaces
//!
//! - [`shop`] - tenant record and shipping settings
//! - [`product`] - product record with embedded variant JSON
//! - [`payment_attempt`] - payment-provider attempt records

pub mod payment_attempt;
pub mod product;
pub mod shop;

pub use payment_attempt::{PaymentAttempt, PaymentAttemptStatus};
pub use product::{Product, ProductCreate, ProductUpdate};
pub use shop::{Shop, ShopCreate, ShippingSettings, ShopSettingsUpdate};
