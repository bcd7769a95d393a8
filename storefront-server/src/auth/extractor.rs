//! JWT extractors
//!
//! [`CurrentUser`] rejects requests without a valid token;
//! [`OptionalUser`] admits anonymous requests (guest checkout) but
//! still rejects tokens that are present and invalid.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::utils::AppError;

fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(header) = parts
        .headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        return Ok(None);
    };
    JwtService::extract_from_header(header)
        .map(Some)
        .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))
}

fn validate(parts: &mut Parts, state: &ServerState, token: &str) -> Result<CurrentUser, AppError> {
    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::from(claims);
            parts.extensions.insert(user.clone());
            Ok(user)
        }
        Err(e) => {
            tracing::warn!(uri = %parts.uri, error = %e, "token validation failed");
            match e {
                JwtError::ExpiredToken => Err(AppError::TokenExpired),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }
        let Some(token) = bearer_token(parts)? else {
            return Err(AppError::Unauthorized);
        };
        let token = token.to_string();
        validate(parts, state, &token)
    }
}

/// Identity when present, `None` for anonymous requests
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<CurrentUser>);

impl FromRequestParts<ServerState> for OptionalUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(OptionalUser(Some(user.clone())));
        }
        let Some(token) = bearer_token(parts)? else {
            return Ok(OptionalUser(None));
        };
        let token = token.to_string();
        validate(parts, state, &token).map(|user| OptionalUser(Some(user)))
    }
}
