use super::handlers;
use super::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    let upload_limit = state.config.transcription.max_upload_bytes;

    let mut router = Router::new()
        // Health check
        .route("/api/health", get(handlers::health_check))
        // Upstream proxies
        .route("/api/chatkit/session", post(handlers::create_session))
        .route(
            "/api/transcribe",
            post(handlers::transcribe).layer(DefaultBodyLimit::max(upload_limit)),
        );

    // Static bundle with SPA fallback, unless running API-only
    if state.assets.is_some() {
        router = router
            .route("/", get(handlers::serve_index))
            .route("/*path", get(handlers::serve_asset));
    }

    // Any origin, no credentials
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .layer(cors)
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
