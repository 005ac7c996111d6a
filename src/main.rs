use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use solar_panel_api::cli::{Cli, Commands};
use solar_panel_api::config::{self, AppConfig, StoreBackend};
use solar_panel_api::database::{DatabaseManager, Store};
use solar_panel_api::{app, is_development, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = config::config().clone();

    match cli.effective_command() {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.api.host = host;
            }
            if let Some(port) = port {
                config.api.port = port;
            }
            serve(config).await
        }
        Commands::Migrate => migrate(&config).await,
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    config.validate().context("invalid configuration")?;

    if is_development!() && std::env::var("JWT_SECRET").is_err() {
        tracing::warn!("JWT_SECRET not set; using the built-in development secret");
    }

    tracing::info!("Starting Solar Panel API in {:?} mode", config.environment);

    let store: Arc<dyn Store> = DatabaseManager::open_store(&config.database)
        .await
        .context("failed to open store")?;

    let bind_addr = format!("{}:{}", config.api.host, config.api.port);
    let state = AppState::new(config, store.clone()).context("failed to initialise auth")?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Solar Panel API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    store.close().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    if config.database.backend != StoreBackend::Postgres {
        anyhow::bail!("migrations only apply to the postgres backend");
    }

    let pool = DatabaseManager::connect(&config.database).await?;
    DatabaseManager::migrate(&pool).await?;
    pool.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
