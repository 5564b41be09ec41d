//! Repository Module
//!
//! Provides CRUD operations for SurrealDB tables.
//!
//! ID convention: 全栈统一使用 "table:id" 字符串格式。查询一律通过
//! `<string>id AS id` 把 RecordId 转成字符串返回；写入通过
//! `type::thing($table, $id)` 还原。

pub mod order;
pub mod payment_attempt;
pub mod product;
pub mod shop;

// Re-exports
pub use order::OrderRepository;
pub use payment_attempt::PaymentAttemptRepository;
pub use product::ProductRepository;
pub use shop::ShopRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    /// Compare-and-swap miss: the guarded field changed under us
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

/// Strip "table:" prefix from a full record id, if present
pub fn strip_table_prefix<'a>(table: &str, id: &'a str) -> &'a str {
    id.strip_prefix(table)
        .and_then(|rest| rest.strip_prefix(':'))
        .unwrap_or(id)
}

/// Record keys are snowflake i64; parse one out of a "table:id" string
pub fn numeric_key(table: &str, id: &str) -> RepoResult<i64> {
    strip_table_prefix(table, id)
        .parse()
        .map_err(|_| RepoError::Validation(format!("Invalid {table} id: {id}")))
}
