//! Test server harness for E2E testing.
//!
//! Provides `TestServer` for spawning real service instances in tests.

use jwks_service::config::Config;
use jwks_service::handlers::auth_handler::AppState;
use jwks_service::routes;
use jwks_service::services::key_lifecycle::{KeyLifecycleConfig, KeyLifecycleManager};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Fast-cycling lifecycle configuration for tests.
///
/// Short lifetimes and a tight sweep interval keep rotation observable
/// within test timeouts without burning wall-clock time.
#[must_use]
pub fn fast_lifecycle_config() -> KeyLifecycleConfig {
    KeyLifecycleConfig::default()
        .with_active_ttl_secs(60)
        .with_expired_offset_secs(-60)
        .with_sweep_interval(Duration::from_millis(50))
}

/// Test harness for spawning the token-signing service in E2E tests.
///
/// The server binds a random available port and runs the real route table
/// over a caller-visible key lifecycle manager, so tests can drive HTTP
/// traffic and inspect the stores behind it.
pub struct TestServer {
    addr: SocketAddr,
    key_manager: Arc<KeyLifecycleManager>,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Spawn a test server with a started manager using
    /// [`fast_lifecycle_config`].
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        let key_manager = Arc::new(KeyLifecycleManager::new(fast_lifecycle_config()));
        key_manager
            .start()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start key manager: {}", e))?;

        Self::spawn_with_manager(key_manager).await
    }

    /// Spawn a test server around a caller-provided manager.
    ///
    /// The manager is used as-is; callers control whether it has been
    /// started, which lets tests exercise the lazy-creation and failure
    /// paths through the HTTP surface.
    pub async fn spawn_with_manager(
        key_manager: Arc<KeyLifecycleManager>,
    ) -> Result<Self, anyhow::Error> {
        // Default config; the bind address below supersedes it.
        let config = Config::from_vars(&HashMap::new())
            .map_err(|e| anyhow::anyhow!("Failed to build test config: {}", e))?;

        let state = Arc::new(AppState {
            key_manager: Arc::clone(&key_manager),
            config,
        });

        let app = routes::build_routes(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            key_manager,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get the key lifecycle manager backing the server.
    pub fn key_manager(&self) -> &Arc<KeyLifecycleManager> {
        &self.key_manager
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Explicitly abort the HTTP server task so each test tears down
        // immediately when it completes.
        self._handle.abort();
    }
}
