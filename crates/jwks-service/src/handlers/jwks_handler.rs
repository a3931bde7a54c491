use crate::handlers::auth_handler::AppState;
use crate::models::{HealthResponse, Jwks};
use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;
use tracing::instrument;

/// Handle JWKS request.
///
/// GET /.well-known/jwks.json and GET /jwks
///
/// Returns the public projection of all currently valid active keys
/// (RFC 7517). Expired keys are filtered out at read time regardless of
/// sweep cadence, so a cached kid disappears from this set on the next
/// fetch after rotation.
#[instrument(name = "jwks.get", skip_all)]
pub async fn handle_get_jwks(State(state): State<Arc<AppState>>) -> Json<Jwks> {
    Json(state.key_manager.active_jwks(Utc::now()).await)
}

/// Liveness check.
///
/// GET /healthz
pub async fn handle_healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
