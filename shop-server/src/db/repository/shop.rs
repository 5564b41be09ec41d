//! Shop Repository

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use shared::models::{Shop, ShopCreate, ShopSettingsUpdate};
use shared::util::{now_millis, snowflake_id};

use super::{BaseRepository, RepoError, RepoResult, numeric_key};

const SHOP_TABLE: &str = "shop";

#[derive(Clone)]
pub struct ShopRepository {
    base: BaseRepository,
}

impl ShopRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a new shop
    pub async fn create(&self, data: ShopCreate) -> RepoResult<Shop> {
        if data.slug.trim().is_empty() {
            return Err(RepoError::Validation("slug cannot be empty".into()));
        }
        if self.find_by_slug(&data.slug).await?.is_some() {
            return Err(RepoError::Conflict(format!(
                "slug '{}' is already taken",
                data.slug
            )));
        }

        let now = now_millis();
        let shop = Shop {
            id: None,
            name: data.name,
            slug: data.slug,
            currency: data.currency.unwrap_or_else(|| "HKD".into()),
            order_prefix: data.order_prefix.unwrap_or_else(|| "SL".into()),
            order_seq: 0,
            shipping: data.shipping.unwrap_or_default(),
            enabled_payment_methods: data
                .enabled_payment_methods
                .unwrap_or_else(|| vec!["fps".into(), "payme".into(), "alipay".into()]),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let key = snowflake_id();
        self.base
            .db()
            .query("CREATE type::thing($tb, $key) CONTENT $data RETURN NONE")
            .bind(("tb", SHOP_TABLE))
            .bind(("key", key))
            .bind(("data", shop))
            .await?
            .check()?;

        self.find_by_id(&format!("{SHOP_TABLE}:{key}"))
            .await?
            .ok_or_else(|| RepoError::Database("shop vanished after create".into()))
    }

    /// Find shop by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Shop>> {
        let key = numeric_key(SHOP_TABLE, id)?;
        let shops: Vec<Shop> = self
            .base
            .db()
            .query("SELECT *, <string>id AS id FROM type::thing($tb, $key)")
            .bind(("tb", SHOP_TABLE))
            .bind(("key", key))
            .await?
            .take(0)?;
        Ok(shops.into_iter().next())
    }

    /// Find shop by storefront slug
    pub async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Shop>> {
        let shops: Vec<Shop> = self
            .base
            .db()
            .query("SELECT *, <string>id AS id FROM type::table($tb) WHERE slug = $slug")
            .bind(("tb", SHOP_TABLE))
            .bind(("slug", slug.to_string()))
            .await?
            .take(0)?;
        Ok(shops.into_iter().next())
    }

    /// Update shop settings
    pub async fn update_settings(&self, id: &str, data: ShopSettingsUpdate) -> RepoResult<Shop> {
        let key = numeric_key(SHOP_TABLE, id)?;
        let mut shop = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Shop {id}")))?;

        if let Some(name) = data.name {
            shop.name = name;
        }
        if let Some(shipping) = data.shipping {
            shop.shipping = shipping;
        }
        if let Some(methods) = data.enabled_payment_methods {
            shop.enabled_payment_methods = methods;
        }
        if let Some(is_active) = data.is_active {
            shop.is_active = is_active;
        }
        shop.updated_at = now_millis();

        let mut content = shop.clone();
        content.id = None;
        self.base
            .db()
            .query("UPDATE type::thing($tb, $key) CONTENT $data RETURN NONE")
            .bind(("tb", SHOP_TABLE))
            .bind(("key", key))
            .bind(("data", content))
            .await?
            .check()?;

        Ok(shop)
    }

    /// Atomically allocate the next order sequence number for a shop
    pub async fn next_order_seq(&self, id: &str) -> RepoResult<i64> {
        let key = numeric_key(SHOP_TABLE, id)?;
        let seqs: Vec<i64> = self
            .base
            .db()
            .query("UPDATE type::thing($tb, $key) SET orderSeq += 1, updatedAt = $now RETURN VALUE orderSeq")
            .bind(("tb", SHOP_TABLE))
            .bind(("key", key))
            .bind(("now", now_millis()))
            .await?
            .take(0)?;
        seqs.into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Shop {id}")))
    }
}
