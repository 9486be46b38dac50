use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Call session control
        .route("/call/start", post(handlers::start_call))
        .route("/call/end", post(handlers::end_call))
        .route("/call/retry", post(handlers::retry_call))
        .route("/call/mute", post(handlers::toggle_mute))
        .route("/call/quick-action", post(handlers::quick_action))
        // Call session queries
        .route("/call/status", get(handlers::call_status))
        .route("/call/transcript", get(handlers::call_transcript))
        // Voice request moderation
        .route(
            "/voice-requests",
            get(handlers::list_requests).post(handlers::submit_request),
        )
        .route("/voice-requests/counts", get(handlers::request_counts))
        .route(
            "/voice-requests/:id/decision",
            post(handlers::decide_request),
        )
        // Widget visibility for the portal shell
        .route("/widget/visibility", get(handlers::widget_visibility))
        // The portal UI calls this API cross-origin
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
