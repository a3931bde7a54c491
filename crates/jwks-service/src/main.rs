use jwks_service::config::Config;
use jwks_service::handlers::auth_handler::AppState;
use jwks_service::routes;
use jwks_service::services::key_lifecycle::KeyLifecycleManager;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jwks_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting token issuer");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!("Configuration loaded successfully");

    // Initialize signing keys and begin rotation sweeps. A failure here is
    // fatal: the service must not serve traffic without its initial keys.
    info!("Initializing signing keys...");
    let key_manager = Arc::new(KeyLifecycleManager::new(config.key_lifecycle()));
    key_manager.start().await.map_err(|e| {
        error!("Failed to initialize signing keys: {}", e);
        e
    })?;

    info!("Signing keys initialized");

    // Parse bind address before moving config
    let bind_address = config.bind_address.clone();

    // Create application state
    let state = Arc::new(AppState {
        key_manager,
        config,
    });

    // Build application routes
    let app = routes::build_routes(state);

    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("Token issuer listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
