//! Storefront server
//!
//! Commerce backend over an embedded SurrealDB: catalog, order
//! workflow, user listing and media storage behind a resource API.

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod routes;
pub mod services;
pub mod utils;

pub use crate::core::{Config, Server, ServerState};
pub use crate::utils::{AppError, AppResult};
