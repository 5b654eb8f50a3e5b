use axum::{
    routing::{get, post},
    Router,
};

use crate::web::{handlers, state::AppState};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/download", post(handlers::submit))
        .route("/health", get(handlers::health))
        .with_state(state)
}
