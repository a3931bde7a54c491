//! Token-signing sandbox service library.
//!
//! Issues and publishes RSA signing keys for exercising JWT/JWKS
//! verification flows, including deliberately expired keys for negative
//! testing.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `crypto` - RSA key-pair generation and RS256 signing
//! - `errors` - Error types and HTTP boundary mapping
//! - `handlers` - HTTP request handlers
//! - `models` - Wire-format data models
//! - `routes` - Route table
//! - `services` - Key lifecycle management and token issuance

pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
