//! Shared types for the storefront backend
//!
//! Wire-facing models used by the server and any API client:
//! catalog/order/user views, status enums and pagination metadata.

pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{Pagination, OrderStatus, PaymentStatus};
