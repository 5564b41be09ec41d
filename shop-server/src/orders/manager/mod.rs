//! OrdersManager - 订单生命周期管理
//!
//! 所有订单写路径都从这里走：
//!
//! ```text
//! 每个写操作
//!     ├─ 1. 取该订单的进程内异步锁 (DashMap<order_id, Mutex>)
//!     ├─ 2. 读取订单记录
//!     ├─ 3. 在内存副本上执行纯领域逻辑 (shared::order)
//!     ├─ 4. 按读取时的状态做条件更新写回 (守卫未命中 → Conflict)
//!     └─ 5. 返回更新后的订单
//! ```
//!
//! 步骤 4 保证即使有进程外写入者（或多实例部署），同一 source
//! state 上的两个并发流转也不可能都成功。

mod error;
pub use error::*;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use dashmap::DashMap;
use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio::sync::Mutex;
use validator::Validate;

use shared::order::{
    DeliveryMethod, Order, OrderAmounts, OrderItem, OrderStatus, Region, TransitionContext,
};
use shared::util::now_millis;

use crate::db::repository::{OrderRepository, ProductRepository, ShopRepository};
use crate::inventory::{InventoryService, StockLine};
use crate::pricing::compute_quote;
use crate::utils::time::business_date_string;

/// 锁表规模告警阈值
const LOCK_TABLE_WARN_THRESHOLD: usize = 10_000;

/// One cart line of a checkout request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product reference ("product:<id>")
    pub product: String,
    /// Variant key ("M" or "Red|M"), none for single-SKU products
    pub variant_key: Option<String>,
    pub quantity: i32,
}

/// Checkout composition request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub shop: String,
    #[validate(length(min = 1, message = "cart is empty"))]
    pub items: Vec<CartLine>,
    pub delivery_method: DeliveryMethod,
    pub region: Region,
    pub payment_method: String,
    #[validate(length(min = 1, message = "customer name is required"))]
    pub customer_name: String,
    #[validate(length(min = 1, message = "customer contact is required"))]
    pub customer_contact: String,
    /// Validated coupon discount, opaque to the core
    #[serde(default)]
    pub discount: i64,
}

/// Result of a status transition
///
/// `restock_lines` is non-empty exactly when the transition entered a
/// restock-worthy state (CANCELLED / REFUNDED): stock is committed at
/// order placement, so every entry into those states returns it. The
/// caller decides what to do with the lines (normally: feed them to the
/// inventory service).
#[derive(Debug)]
pub struct TransitionOutcome {
    pub order: Order,
    pub restock_lines: Vec<StockLine>,
}

/// 订单生命周期管理器
pub struct OrdersManager {
    orders: OrderRepository,
    shops: ShopRepository,
    products: ProductRepository,
    inventory: Arc<InventoryService>,
    /// 每订单一把进程内异步锁，序列化本实例上的并发写
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl OrdersManager {
    pub fn new(db: Surreal<Db>, inventory: Arc<InventoryService>) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            shops: ShopRepository::new(db.clone()),
            products: ProductRepository::new(db),
            inventory,
            locks: DashMap::new(),
        }
    }

    fn lock_for(&self, order_id: &str) -> Arc<Mutex<()>> {
        let lock = self
            .locks
            .entry(order_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        if self.locks.len() > LOCK_TABLE_WARN_THRESHOLD {
            tracing::warn!(
                lock_count = self.locks.len(),
                "Order lock table exceeds threshold"
            );
        }
        lock
    }

    /// Checkout composition: resolve cart lines, commit stock, compute
    /// totals, allocate the order number and persist at PENDING.
    ///
    /// Stock is taken line by line with a hard stop on the first failure
    /// (the inventory service compensates lines already taken). If the
    /// final persist fails, the committed stock is returned too.
    pub async fn create_order(&self, req: CreateOrderRequest) -> ManagerResult<Order> {
        let shop = self
            .shops
            .find_by_id(&req.shop)
            .await?
            .ok_or_else(|| ManagerError::ShopNotFound(req.shop.clone()))?;
        if !shop.is_active {
            return Err(ManagerError::ShopInactive(req.shop.clone()));
        }
        if !shop
            .enabled_payment_methods
            .iter()
            .any(|m| m == &req.payment_method)
        {
            return Err(ManagerError::PaymentMethodNotEnabled(req.payment_method));
        }
        if req.items.is_empty() {
            return Err(ManagerError::EmptyCart);
        }

        // 解析每一行：锁定下单时单价，组装库存扣减清单
        let mut order_items = Vec::with_capacity(req.items.len());
        let mut stock_lines = Vec::with_capacity(req.items.len());
        for line in &req.items {
            if line.quantity < 1 {
                return Err(ManagerError::InvalidQuantity {
                    product: line.product.clone(),
                    quantity: line.quantity,
                });
            }
            let product = self
                .products
                .find_by_id(&line.product)
                .await?
                .filter(|p| p.is_active)
                .ok_or_else(|| ManagerError::ProductNotFound(line.product.clone()))?;

            order_items.push(OrderItem {
                product: line.product.clone(),
                name: product.name,
                variant_key: line.variant_key.clone(),
                unit_price: product.price,
                quantity: line.quantity,
            });
            stock_lines.push(StockLine {
                product: line.product.clone(),
                selection: line.variant_key.clone(),
                quantity: line.quantity as i64,
            });
        }

        self.inventory.decrement_lines(&stock_lines).await?;

        let subtotal: i64 = order_items.iter().map(|i| i.line_total()).sum();
        let quote = compute_quote(
            subtotal,
            req.delivery_method,
            req.region,
            &shop.shipping,
            req.discount,
        );

        let shop_id = shop.id.clone().unwrap_or_default();
        let order_number = match self
            .allocate_order_number(&shop_id, &shop.order_prefix)
            .await
        {
            Ok(n) => n,
            Err(e) => {
                self.inventory.restock_lines(&stock_lines).await;
                return Err(e);
            }
        };

        let now = now_millis();
        let order = Order::new(
            req.shop,
            order_number,
            order_items,
            OrderAmounts {
                subtotal: quote.subtotal,
                discount: quote.discount,
                delivery_fee: quote.shipping_total,
                total: quote.total,
                currency: shop.currency,
            },
            req.delivery_method,
            req.region,
            req.customer_name,
            req.customer_contact,
            req.payment_method,
            now,
        );

        match self.orders.create(order).await {
            Ok(order) => {
                tracing::info!(
                    order = %order.id.as_deref().unwrap_or_default(),
                    order_number = %order.order_number,
                    total = order.amounts.total,
                    "Order created"
                );
                Ok(order)
            }
            Err(e) => {
                // 落库失败，补回已扣库存
                self.inventory.restock_lines(&stock_lines).await;
                Err(e.into())
            }
        }
    }

    /// 租户内顺序号 + 香港营业日期组成订单编号
    async fn allocate_order_number(&self, shop_id: &str, prefix: &str) -> ManagerResult<String> {
        let seq = self.shops.next_order_seq(shop_id).await?;
        Ok(format!("{}{}{}", prefix, business_date_string(), 1000 + seq))
    }

    /// Drive an order to `target` through the transition table
    pub async fn request_transition(
        &self,
        order_id: &str,
        target: OrderStatus,
        ctx: TransitionContext,
    ) -> ManagerResult<TransitionOutcome> {
        let lock = self.lock_for(order_id);
        let _guard = lock.lock().await;

        let mut order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| ManagerError::OrderNotFound(order_id.to_string()))?;
        let expected = order.status;

        order.apply_transition(target, &ctx, now_millis())?;

        let written = self.orders.update_guarded_by_status(&order, expected).await?;
        if !written {
            return Err(ManagerError::Conflict(order_id.to_string()));
        }
        tracing::info!(order = %order_id, from = ?expected, to = ?target, "Order status changed");

        let restock_lines = if target.triggers_restock() {
            order
                .items
                .iter()
                .map(|item| StockLine {
                    product: item.product.clone(),
                    selection: item.variant_key.clone(),
                    quantity: item.quantity as i64,
                })
                .collect()
        } else {
            Vec::new()
        };

        Ok(TransitionOutcome {
            order,
            restock_lines,
        })
    }

    /// Append an admin note
    pub async fn add_note(
        &self,
        order_id: &str,
        note: &str,
        author: &str,
    ) -> ManagerResult<Order> {
        let lock = self.lock_for(order_id);
        let _guard = lock.lock().await;

        let mut order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| ManagerError::OrderNotFound(order_id.to_string()))?;
        let expected = order.status;

        order.add_note(note, author, now_millis())?;

        let written = self.orders.update_guarded_by_status(&order, expected).await?;
        if !written {
            return Err(ManagerError::Conflict(order_id.to_string()));
        }
        Ok(order)
    }

    /// Attach a manually uploaded payment proof (pending/rejected → uploaded)
    pub async fn upload_payment_proof(
        &self,
        order_id: &str,
        proof_url: &str,
    ) -> ManagerResult<Order> {
        let lock = self.lock_for(order_id);
        let _guard = lock.lock().await;

        let mut order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| ManagerError::OrderNotFound(order_id.to_string()))?;
        let expected = order.payment_status;

        if !order.attach_payment_proof(proof_url, now_millis()) {
            return Err(ManagerError::PaymentAlreadyConfirmed(order_id.to_string()));
        }

        let written = self
            .orders
            .update_guarded_by_payment(&order, expected)
            .await?;
        if !written {
            return Err(ManagerError::Conflict(order_id.to_string()));
        }
        Ok(order)
    }

    /// Confirm an uploaded payment proof; enters PAID
    pub async fn confirm_payment(
        &self,
        order_id: &str,
        confirmed_by: &str,
    ) -> ManagerResult<Order> {
        let lock = self.lock_for(order_id);
        let _guard = lock.lock().await;

        let mut order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| ManagerError::OrderNotFound(order_id.to_string()))?;
        let expected = order.status;

        order.confirm_payment(confirmed_by, now_millis())?;

        let written = self.orders.update_guarded_by_status(&order, expected).await?;
        if !written {
            return Err(ManagerError::Conflict(order_id.to_string()));
        }
        tracing::info!(order = %order_id, by = %confirmed_by, "Payment confirmed, order is PAID");
        Ok(order)
    }

    /// Reject an uploaded payment proof, optionally noting the reason
    pub async fn reject_payment(
        &self,
        order_id: &str,
        reason: Option<&str>,
        author: &str,
    ) -> ManagerResult<Order> {
        let lock = self.lock_for(order_id);
        let _guard = lock.lock().await;

        let mut order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| ManagerError::OrderNotFound(order_id.to_string()))?;
        let expected = order.payment_status;

        let now = now_millis();
        order.reject_payment(now)?;
        if let Some(reason) = reason.map(str::trim).filter(|r| !r.is_empty()) {
            order.add_note(format!("Payment rejected: {reason}"), author, now)?;
        }

        let written = self
            .orders
            .update_guarded_by_payment(&order, expected)
            .await?;
        if !written {
            return Err(ManagerError::Conflict(order_id.to_string()));
        }
        Ok(order)
    }

    /// Get one order
    pub async fn get(&self, order_id: &str) -> ManagerResult<Order> {
        self.orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| ManagerError::OrderNotFound(order_id.to_string()))
    }

    /// List orders, newest first
    pub async fn list(
        &self,
        shop: Option<&str>,
        status: Option<OrderStatus>,
        limit: u32,
        offset: u32,
    ) -> ManagerResult<Vec<Order>> {
        Ok(self.orders.list(shop, status, limit, offset).await?)
    }
}
