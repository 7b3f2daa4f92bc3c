use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use customizer_api::config;
use customizer_api::database::{
    ensure_schema, DatabaseManager, PgProductStore, PgUserDirectory,
};
use customizer_api::otp::{self, MemoryTtlStore, TracingMailer, TtlStore};
use customizer_api::routes;
use customizer_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting Customizer API in {:?} mode", config.environment);
    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set outside development");
    }
    if customizer_api::is_development!() && std::env::var("JWT_SECRET").is_err() {
        tracing::warn!("Using the built-in development JWT secret");
    }

    let pool = DatabaseManager::pool().await.context("connecting to database")?;
    if config.database.auto_migrate {
        ensure_schema(&pool).await.context("preparing database schema")?;
    }

    let challenges = Arc::new(MemoryTtlStore::new());
    let sweeper = otp::spawn_sweeper(
        challenges.clone() as Arc<dyn TtlStore>,
        Duration::from_secs(config.otp.sweep_interval_secs),
    );

    let state = AppState::new(
        Arc::new(PgProductStore::new(pool.clone())),
        Arc::new(PgUserDirectory::new(pool)),
        challenges,
        Arc::new(TracingMailer),
        config,
    );
    let app = routes::app(state, config);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Customizer API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    sweeper.abort();
    DatabaseManager::close().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
