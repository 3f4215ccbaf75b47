mod handlers;
mod models;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub use handlers::{ask, health, index, not_found, submit_form};
pub use models::{AskRequest, AskResponse, ErrorResponse, GoalForm, HealthResponse};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index).post(submit_form))
        .route("/ask", post(ask))
        .route("/health", get(health))
        .fallback(not_found)
        .with_state(state)
}
