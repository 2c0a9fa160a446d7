//! Corkboard API Server
//!
//! Main entry point for the Corkboard backend service.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use corkboard_api::{AppState, create_router};
use corkboard_core::attachment::PolicyCatalog;
use corkboard_core::ratelimit::FixedWindowLimiter;
use corkboard_core::storage::{StorageError, StorageProvider, StorageService};
use corkboard_db::connect;
use corkboard_shared::{AppConfig, JwtConfig, JwtService, StorageSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "corkboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = connect(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;
    info!("Connected to database");

    // Create JWT service
    let jwt_config = JwtConfig {
        secret: config.jwt.secret.clone(),
        #[allow(clippy::cast_possible_wrap)]
        access_token_expires_minutes: (config.jwt.access_token_expiry_secs / 60) as i64,
        #[allow(clippy::cast_possible_wrap)]
        refresh_token_expires_days: (config.jwt.refresh_token_expiry_secs / 86400) as i64,
    };
    let jwt_service = JwtService::new(jwt_config);

    // Set up object storage; absent configuration disables uploads
    let storage = match &config.storage {
        Some(settings) => {
            let service = build_storage(settings)?;
            info!(provider = %settings.provider, "Object storage configured");
            Some(Arc::new(service))
        }
        None => {
            warn!("No storage configured, file uploads are disabled");
            None
        }
    };

    // Create rate limiter; stale per-IP windows are swept in the
    // background so one-off clients do not accumulate
    let rate_limiter = Arc::new(FixedWindowLimiter::new(
        config.rate_limit.max_requests,
        config.rate_limit.window_secs,
    ));
    FixedWindowLimiter::spawn_sweeper(
        rate_limiter.clone(),
        Duration::from_secs(config.rate_limit.window_secs),
    );

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        storage,
        policies: PolicyCatalog::default(),
        rate_limiter,
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    // ConnectInfo feeds the per-IP rate limiter
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}

/// Builds a storage service from the configured provider settings.
fn build_storage(settings: &StorageSettings) -> anyhow::Result<StorageService> {
    let require = |field: Option<&String>, name: &str| -> anyhow::Result<String> {
        field
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("storage.{name} is required for {}", settings.provider))
    };

    let provider = match settings.provider.as_str() {
        "s3" => StorageProvider::s3(
            require(settings.endpoint.as_ref(), "endpoint")?,
            require(settings.bucket.as_ref(), "bucket")?,
            require(settings.access_key_id.as_ref(), "access_key_id")?,
            require(settings.secret_access_key.as_ref(), "secret_access_key")?,
            require(settings.region.as_ref(), "region")?,
        ),
        "azure_blob" => StorageProvider::azure_blob(
            require(settings.account.as_ref(), "account")?,
            require(settings.access_key.as_ref(), "access_key")?,
            require(settings.container.as_ref(), "container")?,
        ),
        "local_fs" => StorageProvider::local_fs(require(settings.root.as_ref(), "root")?),
        other => anyhow::bail!("unknown storage provider: {other}"),
    };

    StorageService::new(&provider).map_err(|e: StorageError| e.into())
}
