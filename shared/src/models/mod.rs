//! Data models
//!
//! Shared between storefront-server and frontend (via API).
//! All IDs are `table:key` strings, matching the database record IDs.

pub mod category;
pub mod order;
pub mod pagination;
pub mod product;
pub mod user;

// Re-exports
pub use category::*;
pub use order::*;
pub use pagination::*;
pub use product::*;
pub use user::*;
