//! Resource API
//!
//! One module per resource, each exposing `router()`.

pub mod categories;
pub mod health;
pub mod orders;
pub mod products;
pub mod users;
