//! Database models
//!
//! Rows as stored in SurrealDB. Record links stay native [`surrealdb::RecordId`]s
//! here; the string form only appears in the shared view models.

pub mod category;
pub mod order;
pub mod product;
pub mod user;

pub use category::CategoryRecord;
pub use order::{AddressRecord, OrderItemRecord, OrderRecord};
pub use product::ProductRecord;
pub use user::UserRecord;

use chrono::{DateTime, Utc};

/// Timestamps are stored as epoch milliseconds
pub fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
