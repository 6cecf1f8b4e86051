pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::diff::handlers as diff_handlers;
use crate::enhance::handlers as enhance_handlers;
use crate::prompt::handlers as prompt_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Prompt builder
        .route("/api/v1/prompt/build", post(prompt_handlers::handle_build))
        .route("/api/v1/prompt/score", post(prompt_handlers::handle_score))
        .route(
            "/api/v1/prompt/catalog",
            get(prompt_handlers::handle_catalog),
        )
        .route(
            "/api/v1/context/score",
            post(prompt_handlers::handle_context_score),
        )
        .route(
            "/api/v1/context/summarize",
            post(prompt_handlers::handle_summarize),
        )
        // Version comparison
        .route("/api/v1/diff", post(diff_handlers::handle_diff))
        // Streaming enhancement
        .route("/api/v1/enhance", post(enhance_handlers::handle_enhance))
        .with_state(state)
}
