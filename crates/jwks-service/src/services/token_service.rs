//! Token issuance over the key lifecycle manager.
//!
//! Thin orchestration: pick a record, sign the fixed demo claims with it,
//! and shape the response. Absence of a usable key is self-healed by the
//! manager's accessors, never surfaced as an error.

use crate::crypto::{self, Claims};
use crate::errors::JwksError;
use crate::models::TokenResponse;
use crate::services::key_lifecycle::KeyLifecycleManager;
use chrono::{DateTime, SecondsFormat, Utc};

/// Fixed demo subject carried by every issued token.
const DEMO_SUBJECT: &str = "user-123";
const DEMO_NAME: &str = "Demo User";

/// Issue a compact RS256 token signed with the current active key, or with
/// the current expired key when `want_expired` is set.
///
/// The token's `exp` claim mirrors the signing key's own expiry, so a token
/// from an expired key is itself already expired.
pub async fn issue_token(
    manager: &KeyLifecycleManager,
    want_expired: bool,
) -> Result<TokenResponse, JwksError> {
    let record = if want_expired {
        manager.expired_signing_key().await?
    } else {
        manager.signing_key().await?
    };

    let exp = record.expires_at().timestamp();
    let claims = Claims {
        sub: DEMO_SUBJECT.to_string(),
        name: DEMO_NAME.to_string(),
        iat: Utc::now().timestamp(),
        exp,
    };

    let token = crypto::sign_jwt(&claims, record.encoding_key(), record.kid())?;

    let expires_at = DateTime::<Utc>::from_timestamp(exp, 0)
        .ok_or_else(|| JwksError::KeyStore(format!("Key expiry out of range: {}", exp)))?
        .to_rfc3339_opts(SecondsFormat::Secs, true);

    Ok(TokenResponse {
        token,
        kid: record.kid().to_string(),
        expires_at,
        expired: want_expired,
    })
}
