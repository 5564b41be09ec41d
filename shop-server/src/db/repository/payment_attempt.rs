//! Payment Attempt Repository
//!
//! Append-and-read store for provider webhook records. The displayed
//! "last payment status" is the first row under descending creation
//! time.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use shared::models::PaymentAttempt;
use shared::util::snowflake_id;

use super::{BaseRepository, RepoError, RepoResult};

const ATTEMPT_TABLE: &str = "payment_attempt";

#[derive(Clone)]
pub struct PaymentAttemptRepository {
    base: BaseRepository,
}

impl PaymentAttemptRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Record a webhook-delivered attempt
    pub async fn create(&self, mut attempt: PaymentAttempt) -> RepoResult<PaymentAttempt> {
        let key = snowflake_id();
        attempt.id = None;
        self.base
            .db()
            .query("CREATE type::thing($tb, $key) CONTENT $data RETURN NONE")
            .bind(("tb", ATTEMPT_TABLE))
            .bind(("key", key))
            .bind(("data", attempt))
            .await?
            .check()?;

        let attempts: Vec<PaymentAttempt> = self
            .base
            .db()
            .query("SELECT *, <string>id AS id FROM type::thing($tb, $key)")
            .bind(("tb", ATTEMPT_TABLE))
            .bind(("key", key))
            .await?
            .take(0)?;
        attempts
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("payment attempt vanished after create".into()))
    }

    /// All attempts for an order, newest first
    pub async fn find_for_order(&self, order_id: &str) -> RepoResult<Vec<PaymentAttempt>> {
        let attempts: Vec<PaymentAttempt> = self
            .base
            .db()
            .query("SELECT *, <string>id AS id FROM type::table($tb) WHERE `order` = $order ORDER BY createdAt DESC")
            .bind(("tb", ATTEMPT_TABLE))
            .bind(("order", order_id.to_string()))
            .await?
            .take(0)?;
        Ok(attempts)
    }
}
