use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Service error taxonomy.
///
/// Every internal failure collapses to an opaque 500 at the HTTP boundary;
/// the boundary logs the underlying cause, callers never see it. Unsupported
/// methods carry the single allowed method for the `Allow` header.
#[derive(Debug, Error)]
pub enum JwksError {
    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Key store error: {0}")]
    KeyStore(String),

    #[error("Method not allowed, supported: {allow}")]
    MethodNotAllowed { allow: &'static str },
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

impl IntoResponse for JwksError {
    fn into_response(self) -> Response {
        match self {
            JwksError::MethodNotAllowed { allow } => (
                StatusCode::METHOD_NOT_ALLOWED,
                [(header::ALLOW, allow)],
                Json(ErrorBody {
                    error: "method_not_allowed",
                }),
            )
                .into_response(),
            err => {
                tracing::error!(error = %err, "Request processing failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        error: "internal_error",
                    }),
                )
                    .into_response()
            }
        }
    }
}
