//! # JWKS Test Utilities
//!
//! Shared test utilities for the token-signing sandbox service.
//!
//! This crate provides:
//! - A server test harness (`TestServer`) for E2E tests over real HTTP
//! - A fast-cycling lifecycle configuration for observable rotation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jwks_test_utils::TestServer;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let server = TestServer::spawn().await?;
//!
//!     let response = reqwest::get(format!("{}/jwks", server.url())).await?;
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod server_harness;

pub use server_harness::*;
