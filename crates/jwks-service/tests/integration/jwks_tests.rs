//! Integration tests for the public key distribution endpoints.

use jwks_service::models::Jwks;
use jwks_test_utils::TestServer;
use reqwest::StatusCode;
use std::collections::HashSet;

const JWKS_PATHS: [&str; 2] = ["/.well-known/jwks.json", "/jwks"];

/// The published key set contains only unexpired RSA signing keys, none of
/// which overlap the expired store.
#[tokio::test]
async fn test_jwks_returns_only_unexpired_rsa_keys() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestServer::spawn().await?;

    // Act
    let response = reqwest::get(format!("{}/.well-known/jwks.json", server.url())).await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);

    let jwks: Jwks = response.json().await?;
    assert!(!jwks.keys.is_empty(), "Started server should publish a key");

    for key in &jwks.keys {
        assert_eq!(key.kty, "RSA");
        assert_eq!(key.use_, "sig");
        assert_eq!(key.alg, "RS256");
        assert!(!key.kid.is_empty());
        assert!(!key.n.is_empty());
        assert!(!key.e.is_empty());
    }

    let expired_kids: HashSet<String> = server
        .key_manager()
        .expired_keys()
        .await
        .iter()
        .map(|record| record.kid().to_string())
        .collect();
    for key in &jwks.keys {
        assert!(
            !expired_kids.contains(&key.kid),
            "JWKS must never advertise an expired kid"
        );
    }

    Ok(())
}

/// The short alias serves the identical key set as the well-known path.
#[tokio::test]
async fn test_jwks_alias_matches_well_known_path() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestServer::spawn().await?;

    // Act
    let well_known: Jwks = reqwest::get(format!("{}/.well-known/jwks.json", server.url()))
        .await?
        .json()
        .await?;
    let alias: Jwks = reqwest::get(format!("{}/jwks", server.url()))
        .await?
        .json()
        .await?;

    // Assert
    let well_known_kids: HashSet<String> =
        well_known.keys.iter().map(|key| key.kid.clone()).collect();
    let alias_kids: HashSet<String> = alias.keys.iter().map(|key| key.kid.clone()).collect();
    assert_eq!(
        well_known_kids, alias_kids,
        "Both JWKS paths should serve the same key set"
    );

    Ok(())
}

/// Unsupported methods on either JWKS path are rejected with 405, an exact
/// Allow header, and the fixed error body.
#[tokio::test]
async fn test_non_get_methods_rejected_on_jwks_paths() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();

    for path in JWKS_PATHS {
        let url = format!("{}{}", server.url(), path);

        for response in [
            client.post(&url).send().await?,
            client.put(&url).send().await?,
            client.delete(&url).send().await?,
        ] {
            // Assert
            assert_eq!(
                response.status(),
                StatusCode::METHOD_NOT_ALLOWED,
                "Non-GET request to {} should be rejected",
                path
            );
            assert_eq!(
                response
                    .headers()
                    .get(reqwest::header::ALLOW)
                    .and_then(|value| value.to_str().ok()),
                Some("GET"),
                "Allow header should name the single supported method"
            );

            let body: serde_json::Value = response.json().await?;
            assert_eq!(body["error"].as_str(), Some("method_not_allowed"));
        }
    }

    Ok(())
}
