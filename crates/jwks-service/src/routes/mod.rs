use crate::errors::JwksError;
use crate::handlers::auth_handler::{self, AppState};
use crate::handlers::jwks_handler;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the full route table over the shared application state.
pub fn build_routes(state: Arc<AppState>) -> Router {
    Router::new()
        // Liveness
        .route("/healthz", get(jwks_handler::handle_healthz))
        // Public key distribution (well-known path plus short alias)
        .route(
            "/.well-known/jwks.json",
            get(jwks_handler::handle_get_jwks).fallback(method_not_allowed_get),
        )
        .route(
            "/jwks",
            get(jwks_handler::handle_get_jwks).fallback(method_not_allowed_get),
        )
        // Token issuance
        .route(
            "/auth",
            post(auth_handler::handle_issue_token).fallback(method_not_allowed_post),
        )
        // Request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 405 for unsupported methods on GET-only routes.
async fn method_not_allowed_get() -> JwksError {
    JwksError::MethodNotAllowed { allow: "GET" }
}

/// 405 for unsupported methods on POST-only routes.
async fn method_not_allowed_post() -> JwksError {
    JwksError::MethodNotAllowed { allow: "POST" }
}
