//! Category API

pub mod handler;

use axum::Router;
use axum::routing::{delete, get, post, put};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/category", get(handler::list))
        .route("/category", post(handler::create))
        .route("/category/names", get(handler::names))
        .route("/category/{id}", put(handler::update))
        .route("/category/{id}", delete(handler::remove))
}
