use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use super::api_keys;
use super::auth;
use super::health;
use super::middleware::{body_limit_middleware, security_headers_middleware};
use super::playground;
use super::state::AppState;
use super::users;

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        // Health endpoint
        .route("/health", get(health::health_check))
        // Session endpoints
        .nest("/auth", auth::create_auth_router())
        // Registration
        .route("/users", post(users::register))
        // Per-user key management
        .nest("/api-keys", api_keys::create_api_keys_router())
        // Playground key validation
        .route("/validate-key", post(playground::validate_key))
        // Add state and middleware
        .with_state(state)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(body_limit_middleware))
        .layer(TraceLayer::new_for_http())
}
