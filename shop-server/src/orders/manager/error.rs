use thiserror::Error;

use shared::error::DomainError;

use crate::db::repository::RepoError;
use crate::inventory::InventoryError;
use crate::utils::AppError;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Shop not found: {0}")]
    ShopNotFound(String),

    #[error("Shop is inactive: {0}")]
    ShopInactive(String),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Order has no items")]
    EmptyCart,

    #[error("Invalid quantity {quantity} for {product}")]
    InvalidQuantity { product: String, quantity: i32 },

    #[error("Payment method '{0}' is not enabled for this shop")]
    PaymentMethodNotEnabled(String),

    #[error("Payment already confirmed for order {0}")]
    PaymentAlreadyConfirmed(String),

    /// 条件更新未命中：订单在锁外被其他写入者改动
    #[error("Concurrent update on order {0}")]
    Conflict(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error("Storage error: {0}")]
    Repo(#[from] RepoError),
}

impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::OrderNotFound(id) => AppError::not_found(format!("Order {id}")),
            ManagerError::ShopNotFound(id) => AppError::not_found(format!("Shop {id}")),
            ManagerError::ShopInactive(id) => {
                AppError::business_rule(format!("Shop {id} is inactive"))
            }
            ManagerError::ProductNotFound(id) => AppError::not_found(format!("Product {id}")),
            ManagerError::EmptyCart => AppError::validation("Order has no items"),
            ManagerError::InvalidQuantity { product, quantity } => {
                AppError::validation(format!("Invalid quantity {quantity} for {product}"))
            }
            ManagerError::PaymentMethodNotEnabled(method) => {
                AppError::business_rule(format!("Payment method '{method}' is not enabled"))
            }
            ManagerError::PaymentAlreadyConfirmed(id) => {
                AppError::business_rule(format!("Payment already confirmed for order {id}"))
            }
            ManagerError::Conflict(id) => {
                AppError::conflict(format!("Concurrent update on order {id}"))
            }
            ManagerError::Domain(e) => AppError::Domain(e),
            ManagerError::Inventory(e) => e.into(),
            ManagerError::Repo(e) => e.into(),
        }
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
