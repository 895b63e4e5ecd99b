pub mod auth;
pub mod middleware;
pub mod rest;
pub mod state;

pub use middleware::require_auth;
pub use rest::{create_summary_handler, current_summary_handler, formats_handler};

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::web::{
    auth::{login_handler, logout_handler, session_handler, signup_handler},
    state::AppState,
};

/// Builds the API router. CORS and the Swagger UI are layered on by the binary.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/auth/session", get(session_handler))
        .route("/formats", get(formats_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/summaries", post(create_summary_handler))
        .route("/summaries/current", get(current_summary_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(app_state.config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
