//! Integration tests for time-based key rotation observed over HTTP.

use jsonwebtoken::decode_header;
use jwks_service::models::{Jwks, TokenResponse};
use jwks_service::services::key_lifecycle::{KeyLifecycleConfig, KeyLifecycleManager};
use jwks_test_utils::TestServer;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;

fn rotation_config() -> KeyLifecycleConfig {
    KeyLifecycleConfig::default()
        .with_active_ttl_secs(1)
        .with_expired_offset_secs(-60)
        .with_sweep_interval(Duration::from_millis(10))
}

/// A key advertised at startup disappears from the JWKS and surfaces in the
/// expired store once its validity window elapses.
#[tokio::test]
async fn test_active_key_rotation_visible_over_http() -> Result<(), anyhow::Error> {
    // Arrange
    let manager = Arc::new(KeyLifecycleManager::new(rotation_config()));
    manager
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("manager start failed: {}", e))?;
    let server = TestServer::spawn_with_manager(Arc::clone(&manager)).await?;

    let initial: Jwks = reqwest::get(format!("{}/jwks", server.url()))
        .await?
        .json()
        .await?;
    let kid = initial
        .keys
        .first()
        .ok_or_else(|| anyhow::anyhow!("no key published at startup"))?
        .kid
        .clone();

    // Act - wait past the 1s TTL plus sweep slack
    tokio::time::sleep(Duration::from_millis(1200)).await;

    // Assert
    let rotated: Jwks = reqwest::get(format!("{}/jwks", server.url()))
        .await?
        .json()
        .await?;
    assert!(
        rotated.keys.iter().all(|key| key.kid != kid),
        "Rotated kid should disappear from the published JWKS"
    );

    let expired_kids: Vec<String> = manager
        .expired_keys()
        .await
        .iter()
        .map(|record| record.kid().to_string())
        .collect();
    assert!(
        expired_kids.contains(&kid),
        "Rotated kid should surface in the expired store"
    );

    manager.stop().await;
    Ok(())
}

/// Token issuance keeps succeeding while keys rotate underneath concurrent
/// callers; the lazy replenishment path covers the generation window.
#[tokio::test]
async fn test_concurrent_issuance_during_rotation() -> Result<(), anyhow::Error> {
    // Arrange
    let manager = Arc::new(KeyLifecycleManager::new(rotation_config()));
    manager
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("manager start failed: {}", e))?;
    let server = TestServer::spawn_with_manager(Arc::clone(&manager)).await?;
    let url = format!("{}/auth", server.url());

    // Act - three bursts of concurrent requests spanning a rotation boundary
    for _ in 0..3 {
        let mut handles = Vec::new();
        for _ in 0..5 {
            let client = reqwest::Client::new();
            let url = url.clone();
            handles.push(tokio::spawn(async move {
                client.post(url).send().await?.error_for_status()
            }));
        }

        for handle in handles {
            // Assert - every request succeeds with a well-formed token
            let response = handle.await??;
            assert_eq!(response.status(), StatusCode::OK);

            let body: TokenResponse = response.json().await?;
            let header = decode_header(&body.token)?;
            assert_eq!(header.kid.as_deref(), Some(body.kid.as_str()));
        }

        tokio::time::sleep(Duration::from_millis(600)).await;
    }

    manager.stop().await;
    Ok(())
}
