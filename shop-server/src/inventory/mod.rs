//! Inventory service
//!
//! 把纯规格模型绑定到持久化层，并保证扣减的原子性：
//! 读 `sizes` + `stockVersion` → 在规格副本上扣减 → 带版本守卫写回。
//! 守卫未命中说明有并发写，重读重试（有限次）。并发抢最后一件时，
//! 输家重读后看到 0 库存，得到 `InsufficientStock`，绝不超卖。
//!
//! 读路径 fail closed：`sizes` 解析失败按零库存处理（记日志）；
//! 写路径直接把 `MalformedVariantData` 报给调用方。

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

use shared::error::DomainError;
use shared::variant::parse_variant_data;

use crate::db::repository::{ProductRepository, RepoError};
use crate::utils::AppError;

#[cfg(test)]
mod tests;

/// 版本守卫未命中时的最大重试次数
const MAX_STOCK_RETRIES: u32 = 3;

/// One stock movement (decrement or restock)
#[derive(Debug, Clone)]
pub struct StockLine {
    /// Product reference ("product:<id>")
    pub product: String,
    /// Variant key; none for single-SKU products with untracked stock
    pub selection: Option<String>,
    pub quantity: i64,
}

/// Inventory errors
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Storage error: {0}")]
    Repo(#[from] RepoError),

    #[error("Stock update contention on {0}, retries exhausted")]
    Contention(String),
}

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::ProductNotFound(id) => AppError::not_found(format!("Product {id}")),
            InventoryError::Domain(e) => AppError::Domain(e),
            InventoryError::Repo(e) => e.into(),
            InventoryError::Contention(id) => {
                AppError::conflict(format!("Stock update contention on {id}"))
            }
        }
    }
}

pub type InventoryResult<T> = Result<T, InventoryError>;

/// Inventory service over the product repository
pub struct InventoryService {
    products: ProductRepository,
}

impl InventoryService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            products: ProductRepository::new(db),
        }
    }

    /// Remaining quantity for a selection; malformed stock data reads as
    /// zero (fail closed), an unknown selection is still an error
    pub async fn availability(&self, product_id: &str, selection: &str) -> InventoryResult<i64> {
        let product = self
            .products
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| InventoryError::ProductNotFound(product_id.to_string()))?;

        let variant = match parse_variant_data(&product.sizes, product.size_system.as_deref()) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(product = %product_id, error = %e, "Malformed variant data, reading as zero stock");
                return Ok(0);
            }
        };
        Ok(variant.availability(selection)?)
    }

    /// Atomic check-and-decrement of one variant key
    pub async fn decrement(
        &self,
        product_id: &str,
        selection: &str,
        quantity: i64,
    ) -> InventoryResult<()> {
        for _ in 0..MAX_STOCK_RETRIES {
            let product = self
                .products
                .find_by_id(product_id)
                .await?
                .ok_or_else(|| InventoryError::ProductNotFound(product_id.to_string()))?;

            let mut variant = parse_variant_data(&product.sizes, product.size_system.as_deref())?;
            variant.decrement(selection, quantity)?;

            let written = self
                .products
                .update_sizes_guarded(product_id, variant.to_persisted(), product.stock_version)
                .await?;
            if written {
                return Ok(());
            }
            // 版本守卫未命中：并发写抢先，重读再试
            tracing::debug!(product = %product_id, "Stock version moved, retrying decrement");
        }
        Err(InventoryError::Contention(product_id.to_string()))
    }

    /// Return stock for one variant key (no upper bound)
    pub async fn restock(
        &self,
        product_id: &str,
        selection: &str,
        quantity: i64,
    ) -> InventoryResult<()> {
        for _ in 0..MAX_STOCK_RETRIES {
            let product = self
                .products
                .find_by_id(product_id)
                .await?
                .ok_or_else(|| InventoryError::ProductNotFound(product_id.to_string()))?;

            let mut variant = parse_variant_data(&product.sizes, product.size_system.as_deref())?;
            variant.restock(selection, quantity);

            let written = self
                .products
                .update_sizes_guarded(product_id, variant.to_persisted(), product.stock_version)
                .await?;
            if written {
                return Ok(());
            }
        }
        Err(InventoryError::Contention(product_id.to_string()))
    }

    /// Decrement a whole cart
    ///
    /// Hard stop on the first failing line: lines already taken are
    /// restocked before the error propagates, so a failed checkout never
    /// leaves stock committed.
    pub async fn decrement_lines(&self, lines: &[StockLine]) -> InventoryResult<()> {
        let mut taken: Vec<&StockLine> = Vec::with_capacity(lines.len());
        for line in lines {
            let Some(selection) = &line.selection else {
                continue; // 无规格商品不跟踪库存
            };
            match self.decrement(&line.product, selection, line.quantity).await {
                Ok(()) => taken.push(line),
                Err(e) => {
                    self.compensate(&taken).await;
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Return a whole order's lines, best effort
    ///
    /// Used on cancellation/refund. Individual failures are logged, not
    /// propagated: the transition has already been committed.
    pub async fn restock_lines(&self, lines: &[StockLine]) {
        for line in lines {
            let Some(selection) = &line.selection else {
                continue;
            };
            if let Err(e) = self.restock(&line.product, selection, line.quantity).await {
                tracing::warn!(
                    product = %line.product,
                    selection = %selection,
                    quantity = line.quantity,
                    error = %e,
                    "Failed to restock cancelled line"
                );
            }
        }
    }

    async fn compensate(&self, taken: &[&StockLine]) {
        for line in taken {
            let Some(selection) = &line.selection else {
                continue;
            };
            if let Err(e) = self.restock(&line.product, selection, line.quantity).await {
                tracing::error!(
                    product = %line.product,
                    selection = %selection,
                    error = %e,
                    "Failed to compensate partial checkout decrement"
                );
            }
        }
    }
}
