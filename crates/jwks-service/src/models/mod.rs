use serde::{Deserialize, Serialize};

/// JWKS document (RFC 7517).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwks {
    pub keys: Vec<JsonWebKey>,
}

/// JSON Web Key (RFC 7517), RSA public half only.
///
/// Private key material is never part of this projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonWebKey {
    pub kid: String, // Key ID
    pub kty: String, // Key type ("RSA")
    pub n: String,   // Modulus (base64url, unpadded)
    pub e: String,   // Public exponent (base64url, unpadded)
    #[serde(rename = "use")]
    pub use_: String, // Public key use ("sig")
    pub alg: String, // Algorithm ("RS256")
}

/// Response body for `POST /auth`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub kid: String,
    /// Token expiration, ISO-8601 UTC.
    #[serde(rename = "expiresAt")]
    pub expires_at: String,
    /// Whether the token was deliberately signed with an expired key.
    pub expired: bool,
}

/// Liveness response for `GET /healthz`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
