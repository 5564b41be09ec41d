//! Product Repository
//!
//! Stock writes go through the guarded update: `stock_version` must
//! match what the caller read, otherwise the write is refused and the
//! caller re-reads. That makes read-availability-then-decrement
//! non-interleavable per product.

use serde_json::Value;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use shared::models::{Product, ProductCreate, ProductUpdate};
use shared::util::{now_millis, snowflake_id};

use super::{BaseRepository, RepoError, RepoResult, numeric_key};

const PRODUCT_TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a new product
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        let now = now_millis();
        let product = Product {
            id: None,
            shop: data.shop,
            name: data.name,
            description: data.description.unwrap_or_default(),
            price: data.price,
            sizes: data.sizes.unwrap_or(Value::Null),
            size_system: data.size_system,
            stock_version: 0,
            sort_order: data.sort_order.unwrap_or(0),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let key = snowflake_id();
        self.base
            .db()
            .query("CREATE type::thing($tb, $key) CONTENT $data RETURN NONE")
            .bind(("tb", PRODUCT_TABLE))
            .bind(("key", key))
            .bind(("data", product))
            .await?
            .check()?;

        self.find_by_id(&format!("{PRODUCT_TABLE}:{key}"))
            .await?
            .ok_or_else(|| RepoError::Database("product vanished after create".into()))
    }

    /// Find all active products of a shop
    pub async fn find_all(&self, shop: &str) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT *, <string>id AS id FROM type::table($tb) WHERE shop = $shop AND isActive = true ORDER BY sortOrder")
            .bind(("tb", PRODUCT_TABLE))
            .bind(("shop", shop.to_string()))
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find product by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let key = numeric_key(PRODUCT_TABLE, id)?;
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT *, <string>id AS id FROM type::thing($tb, $key)")
            .bind(("tb", PRODUCT_TABLE))
            .bind(("key", key))
            .await?
            .take(0)?;
        Ok(products.into_iter().next())
    }

    /// Update product fields (price changes do not touch captured order
    /// line prices)
    pub async fn update(&self, id: &str, data: ProductUpdate) -> RepoResult<Product> {
        let key = numeric_key(PRODUCT_TABLE, id)?;
        let mut product = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {id}")))?;

        if let Some(name) = data.name {
            product.name = name;
        }
        if let Some(description) = data.description {
            product.description = description;
        }
        if let Some(price) = data.price {
            product.price = price;
        }
        if let Some(size_system) = data.size_system {
            product.size_system = Some(size_system);
        }
        if let Some(sort_order) = data.sort_order {
            product.sort_order = sort_order;
        }
        if let Some(is_active) = data.is_active {
            product.is_active = is_active;
        }
        product.updated_at = now_millis();

        let mut content = product.clone();
        content.id = None;
        self.base
            .db()
            .query("UPDATE type::thing($tb, $key) CONTENT $data RETURN NONE")
            .bind(("tb", PRODUCT_TABLE))
            .bind(("key", key))
            .bind(("data", content))
            .await?
            .check()?;

        Ok(product)
    }

    /// Delete a product
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let key = numeric_key(PRODUCT_TABLE, id)?;
        self.base
            .db()
            .query("DELETE type::thing($tb, $key)")
            .bind(("tb", PRODUCT_TABLE))
            .bind(("key", key))
            .await?
            .check()?;
        Ok(true)
    }

    /// Guarded stock write: succeeds only if `stock_version` still equals
    /// `expected_version`. Returns false on a version miss (caller
    /// re-reads and retries).
    pub async fn update_sizes_guarded(
        &self,
        id: &str,
        sizes: Value,
        expected_version: i64,
    ) -> RepoResult<bool> {
        let key = numeric_key(PRODUCT_TABLE, id)?;
        let updated: Vec<Value> = self
            .base
            .db()
            .query(
                "UPDATE type::thing($tb, $key) \
                 SET sizes = $sizes, stockVersion += 1, updatedAt = $now \
                 WHERE stockVersion = $expected \
                 RETURN VALUE stockVersion",
            )
            .bind(("tb", PRODUCT_TABLE))
            .bind(("key", key))
            .bind(("sizes", sizes))
            .bind(("now", now_millis()))
            .bind(("expected", expected_version))
            .await?
            .take(0)?;
        Ok(!updated.is_empty())
    }

    /// Replace the variant structure outright (admin editor save).
    /// Still bumps `stock_version` so in-flight checkout retries see the
    /// new structure.
    pub async fn replace_sizes(
        &self,
        id: &str,
        sizes: Value,
        size_system: Option<String>,
    ) -> RepoResult<Product> {
        let key = numeric_key(PRODUCT_TABLE, id)?;
        self.base
            .db()
            .query(
                "UPDATE type::thing($tb, $key) \
                 SET sizes = $sizes, sizeSystem = $size_system, \
                     stockVersion += 1, updatedAt = $now \
                 RETURN NONE",
            )
            .bind(("tb", PRODUCT_TABLE))
            .bind(("key", key))
            .bind(("sizes", sizes))
            .bind(("size_system", size_system))
            .bind(("now", now_millis()))
            .await?
            .check()?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {id}")))
    }
}
