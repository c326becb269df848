//! dukaan-api - Retail management backend service
//!
//! Store owner accounts, per-store product catalogs, and barcode resolution
//! against the open product databases, served over HTTP.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use dukaan_api::config::{Cli, Config};
use dukaan_api::identity::HttpIdentityVerifier;
use dukaan_api::resolver::{BarcodeResolver, ProviderChain, SqliteProductCache};
use dukaan_api::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting Dukaan API (dukaan-api) v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let config = Config::load(&cli)?;
    info!("Database path: {}", config.db_path.display());

    let pool = match dukaan_common::db::init_database(&config.db_path).await {
        Ok(pool) => {
            info!("✓ Connected to database");
            pool
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    let verifier = Arc::new(HttpIdentityVerifier::new(config.identity_url.clone()));
    info!("Identity verification delegated to {}", config.identity_url);

    let chain = ProviderChain::from_endpoints(config.providers.clone(), config.provider_timeout);
    info!(
        providers = chain.len(),
        timeout_ms = config.provider_timeout.as_millis() as u64,
        "Provider chain configured"
    );

    let cache = Arc::new(SqliteProductCache::new(pool.clone()));
    let resolver = Arc::new(BarcodeResolver::new(cache, chain));

    let state = AppState::new(pool, verifier, resolver);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("dukaan-api listening on http://0.0.0.0:{}", config.port);
    info!("Health check: http://127.0.0.1:{}/health", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
