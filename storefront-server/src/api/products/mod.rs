//! Product API

pub mod handler;

use axum::Router;
use axum::routing::{delete, get, post, put};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/product", get(handler::list))
        .route("/product", post(handler::create))
        .route("/product/{id}", get(handler::get))
        .route("/product/{id}", put(handler::update))
        .route("/product/{id}", delete(handler::remove))
        .route("/product/category/{id}", get(handler::list_by_category))
}
