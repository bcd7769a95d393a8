//! Repository Module
//!
//! Provides CRUD operations for SurrealDB tables.

// Catalog
pub mod category;
pub mod product;

// Orders
pub mod order;

// Users
pub mod user;

// Re-exports
pub use category::CategoryRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use user::UserRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

use crate::utils::AppError;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Illegal transition: {0}")]
    InvalidTransition(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        let msg = err.to_string();
        // Unique index violations surface as "... already contains ..."
        if msg.contains("already contains") {
            RepoError::Duplicate(msg)
        } else {
            RepoError::Database(msg)
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Conflict(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
            RepoError::InvalidTransition(msg) => AppError::InvalidTransition(msg),
            RepoError::Database(msg) => AppError::Database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: "table:key" strings on the wire, surrealdb::RecordId inside
// =============================================================================
//
//   - Parse:       let id: RecordId = "product:abc".parse()?;
//   - Construct:   RecordId::from_table_key("product", "abc")
//   - Table name:  id.table()
//   - CRUD:        db.select(id) / db.delete(id) take RecordId directly

/// Parse a `table:key` string, enforcing the expected table.
pub fn parse_record_id(id: &str, table: &str) -> RepoResult<surrealdb::RecordId> {
    let record: surrealdb::RecordId = id
        .parse()
        .map_err(|_| RepoError::Validation(format!("Invalid id format: {}", id)))?;
    if record.table() != table {
        return Err(RepoError::Validation(format!(
            "Expected a {} id, got: {}",
            table, id
        )));
    }
    Ok(record)
}

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
