//! Order API

pub mod handler;

use axum::Router;
use axum::routing::{get, patch, post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/order/add", post(handler::create))
        .route("/order", get(handler::list))
        .route("/order/{id}", get(handler::detail))
        .route("/order/{id}/status", patch(handler::change_status))
}
