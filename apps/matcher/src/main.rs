mod analysis;
mod clustering;
mod config;
mod errors;
mod matching;
mod routes;
mod rpc;
mod state;
mod storage;
mod variants;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::FileStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV matcher v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the flat-file store
    let store = FileStore::new(&config.data_dir);
    store
        .init()
        .await
        .with_context(|| format!("Cannot prepare data directory {}", config.data_dir.display()))?;

    info!(
        "Experience overlap: {:?}, variant seed: {:?} (p={})",
        config.experience_overlap, config.variant_seed, config.variant_modify_probability
    );

    // Build app state
    let state = AppState::new(config.clone(), Arc::new(store));

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
