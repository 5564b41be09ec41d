//! Order Repository
//!
//! 订单状态流转必须按 (orderId, 期望当前状态) 做条件更新：
//! 两个并发流转不可能都基于同一个 source state 成功。
//! 条件不满足时不写入、不追加历史，由调用方决定重试或报冲突。

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use shared::order::{Order, OrderStatus, PaymentStatus};
use shared::util::snowflake_id;

use super::{BaseRepository, RepoError, RepoResult, numeric_key};

const ORDER_TABLE: &str = "shop_order";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Persist a freshly composed order, assigning its record id
    pub async fn create(&self, mut order: Order) -> RepoResult<Order> {
        let key = snowflake_id();
        order.id = None;
        self.base
            .db()
            .query("CREATE type::thing($tb, $key) CONTENT $data RETURN NONE")
            .bind(("tb", ORDER_TABLE))
            .bind(("key", key))
            .bind(("data", order))
            .await?
            .check()?;

        let id = format!("{ORDER_TABLE}:{key}");
        self.find_by_id(&id)
            .await?
            .ok_or_else(|| RepoError::Database("order vanished after create".into()))
    }

    /// Find order by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let key = numeric_key(ORDER_TABLE, id)?;
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT *, <string>id AS id FROM type::thing($tb, $key)")
            .bind(("tb", ORDER_TABLE))
            .bind(("key", key))
            .await?
            .take(0)?;
        Ok(orders.into_iter().next())
    }

    /// List orders, newest first, optionally filtered by shop and status
    pub async fn list(
        &self,
        shop: Option<&str>,
        status: Option<OrderStatus>,
        limit: u32,
        offset: u32,
    ) -> RepoResult<Vec<Order>> {
        let mut sql = String::from("SELECT *, <string>id AS id FROM type::table($tb)");
        let mut conditions: Vec<&str> = Vec::new();
        if shop.is_some() {
            conditions.push("shop = $shop");
        }
        if status.is_some() {
            conditions.push("status = $status");
        }
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        // limit/offset 是无符号整数，直接拼接
        sql.push_str(&format!(
            " ORDER BY createdAt DESC LIMIT {} START {}",
            limit.clamp(1, 200),
            offset
        ));

        let mut query = self
            .base
            .db()
            .query(sql)
            .bind(("tb", ORDER_TABLE));
        if let Some(shop) = shop {
            query = query.bind(("shop", shop.to_string()));
        }
        if let Some(status) = status {
            query = query.bind(("status", status));
        }

        let orders: Vec<Order> = query.await?.take(0)?;
        Ok(orders)
    }

    /// Persist a mutated order, guarded on the status the mutation was
    /// computed from. Returns false when the guard misses (concurrent
    /// transition won); nothing is written in that case.
    pub async fn update_guarded_by_status(
        &self,
        order: &Order,
        expected: OrderStatus,
    ) -> RepoResult<bool> {
        let id = order
            .id
            .as_deref()
            .ok_or_else(|| RepoError::Validation("order has no id".into()))?;
        let key = numeric_key(ORDER_TABLE, id)?;

        let mut content = order.clone();
        content.id = None;
        let updated: Vec<serde_json::Value> = self
            .base
            .db()
            .query(
                "UPDATE type::thing($tb, $key) CONTENT $data \
                 WHERE status = $expected RETURN VALUE updatedAt",
            )
            .bind(("tb", ORDER_TABLE))
            .bind(("key", key))
            .bind(("data", content))
            .bind(("expected", expected))
            .await?
            .take(0)?;
        Ok(!updated.is_empty())
    }

    /// Persist a mutated order, guarded on the payment status the
    /// mutation was computed from
    pub async fn update_guarded_by_payment(
        &self,
        order: &Order,
        expected: PaymentStatus,
    ) -> RepoResult<bool> {
        let id = order
            .id
            .as_deref()
            .ok_or_else(|| RepoError::Validation("order has no id".into()))?;
        let key = numeric_key(ORDER_TABLE, id)?;

        let mut content = order.clone();
        content.id = None;
        let updated: Vec<serde_json::Value> = self
            .base
            .db()
            .query(
                "UPDATE type::thing($tb, $key) CONTENT $data \
                 WHERE paymentStatus = $expected RETURN VALUE updatedAt",
            )
            .bind(("tb", ORDER_TABLE))
            .bind(("key", key))
            .bind(("data", content))
            .bind(("expected", expected))
            .await?
            .take(0)?;
        Ok(!updated.is_empty())
    }
}
