//! Result alias
//!
//! Shorthand for the `Result<T, AppError>` every handler and service
//! returns.

use crate::AppError;

/// Result of a handler or service operation
pub type AppResult<T> = Result<T, AppError>;
