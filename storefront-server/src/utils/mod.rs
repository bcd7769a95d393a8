//! Utility module - common helpers and types
//!
//! - [`AppError`] / [`AppResult`] - application error handling
//! - [`ApiResponse`] - response envelope helpers
//! - [`ListParams`] - listing query parameters
//! - validation and tracking-number helpers

pub mod error;
pub mod logger;
pub mod result;
pub mod tracking;
pub mod types;
pub mod validation;

pub use error::{ApiResponse, AppError, ErrorResponse, ok, ok_paged};
pub use result::AppResult;
pub use tracking::generate_tracking_number;
pub use types::ListParams;
