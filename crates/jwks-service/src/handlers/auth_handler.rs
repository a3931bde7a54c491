use crate::config::Config;
use crate::errors::JwksError;
use crate::models::TokenResponse;
use crate::services::key_lifecycle::KeyLifecycleManager;
use crate::services::token_service;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

/// Query parameters accepted by the token endpoint.
#[derive(Debug, Deserialize)]
pub struct IssueTokenParams {
    /// Present (with any value, including none) to request a token signed
    /// with an expired key.
    pub expired: Option<String>,
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub key_manager: Arc<KeyLifecycleManager>,
    pub config: Config,
}

/// Handle token issuance.
///
/// POST /auth
///
/// Signs the fixed demo claims with the current active key, or with the
/// current expired key when the `expired` query parameter is present.
#[instrument(name = "auth.issue_token", skip_all, fields(expired))]
pub async fn handle_issue_token(
    State(state): State<Arc<AppState>>,
    Query(params): Query<IssueTokenParams>,
) -> Result<Json<TokenResponse>, JwksError> {
    let want_expired = params.expired.is_some();
    tracing::Span::current().record("expired", want_expired);

    let response = token_service::issue_token(&state.key_manager, want_expired).await?;

    Ok(Json(response))
}
