//! Cryptographic operations: RSA key-pair generation, public JWK
//! component export, and RS256 compact signing.
//!
//! Generation is CPU-bound (hundreds of milliseconds for a 2048-bit
//! modulus); async callers run it on the blocking thread pool so a slow
//! generation never stalls the runtime.

use crate::errors::JwksError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::instrument;

/// Minimum accepted RSA modulus size.
///
/// RS256 verification in `jsonwebtoken` rejects moduli below 2048 bits, so
/// generating a smaller key would produce tokens no verifier accepts.
/// Requests below this threshold fail up front, before any key material is
/// created.
pub const MIN_RSA_KEY_BITS: usize = 2048;

/// JWT claims carried by issued demo tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // Subject (fixed demo user)
    pub name: String, // Display name (fixed demo user)
    pub iat: i64,     // Issued-at timestamp
    pub exp: i64,     // Expiration timestamp
}

/// Output of [`generate_rsa_key`]: the private signing half plus the public
/// components needed to shape a JWK.
///
/// `Debug` redacts the private half; only public components are printable.
pub struct RsaKeyMaterial {
    /// Private key, ready for RS256 signing. Never serialized.
    pub encoding_key: EncodingKey,
    /// Modulus, base64url without padding.
    pub modulus: String,
    /// Public exponent, base64url without padding.
    pub exponent: String,
}

impl fmt::Debug for RsaKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaKeyMaterial")
            .field("encoding_key", &"[REDACTED]")
            .field("modulus", &self.modulus)
            .field("exponent", &self.exponent)
            .finish()
    }
}

/// Generate a fresh RSA key pair with the given modulus size.
#[instrument(skip_all)]
pub fn generate_rsa_key(bits: usize) -> Result<RsaKeyMaterial, JwksError> {
    if bits < MIN_RSA_KEY_BITS {
        return Err(JwksError::Crypto(format!(
            "RSA modulus too small: {} bits (minimum {})",
            bits, MIN_RSA_KEY_BITS
        )));
    }

    let private_key = RsaPrivateKey::new(&mut rand::thread_rng(), bits)
        .map_err(|e| JwksError::Crypto(format!("RSA key generation failed: {}", e)))?;
    let public_key = RsaPublicKey::from(&private_key);

    let private_pem = private_key
        .to_pkcs1_pem(Default::default())
        .map_err(|e| JwksError::Crypto(format!("Private key encoding failed: {}", e)))?;
    let encoding_key = EncodingKey::from_rsa_pem(private_pem.as_bytes())
        .map_err(|e| JwksError::Crypto(format!("Private key parsing failed: {}", e)))?;

    Ok(RsaKeyMaterial {
        encoding_key,
        modulus: URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
        exponent: URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
    })
}

/// Sign claims as an RS256 compact JWT carrying `kid` in the header.
#[instrument(skip_all)]
pub fn sign_jwt(
    claims: &Claims,
    encoding_key: &EncodingKey,
    key_id: &str,
) -> Result<String, JwksError> {
    let mut header = Header::new(Algorithm::RS256);
    header.typ = Some("JWT".to_string());
    header.kid = Some(key_id.to_string());

    encode(&header, claims, encoding_key)
        .map_err(|e| JwksError::Crypto(format!("JWT signing operation failed: {}", e)))
}
