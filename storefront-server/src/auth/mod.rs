//! Authentication and authorization
//!
//! - [`JwtService`] - token generation and validation
//! - [`CurrentUser`] / [`OptionalUser`] - request extractors
//! - [`authorize`] - explicit role gate for privileged operations

pub mod extractor;
pub mod gate;
pub mod jwt;

pub use extractor::OptionalUser;
pub use gate::authorize;
pub use jwt::{Claims, CurrentUser, JwtError, JwtService};
