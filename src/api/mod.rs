//! Public JSON API.

pub mod handlers;

use axum::{
    routing::{get, post, put},
    Router,
};

use self::handlers::*;
use crate::http::server::AppState;

pub fn setup_api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/api/lessons", get(list_lessons))
        .route("/api/lessons/{id}", get(get_lesson))
        .route("/api/lessons/{id}/spaces", put(adjust_spaces))
        .route("/api/login", post(login))
        .route("/api/orders", post(create_order))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/logs", get(list_logs))
        .route("/api/logs/{id}", get(get_log))
        .with_state(state)
}
