//! `indexer` binary: keeps a SQLite copy of the FundMe contract's `funded`
//! and `withdrawn` events and serves it over HTTP.

mod api;
mod config;
mod db;
mod errors;
mod events;
mod indexer;
mod rpc;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use indexer::IndexerState;

const RPC_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A .env file may carry RUST_LOG, so it is read before the subscriber starts.
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    let pool = db::init_pool(&config.database_url).await?;
    let client = Client::builder().timeout(RPC_TIMEOUT).build()?;

    let shutdown = CancellationToken::new();
    let poller = tokio::spawn(indexer::run(
        Arc::new(IndexerState {
            pool: pool.clone(),
            config: config.clone(),
            client,
        }),
        shutdown.clone(),
    ));

    let app = api::router(Arc::new(api::ApiState { pool }))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.api_port)).await?;
    info!(addr = %listener.local_addr()?, "API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_ctrl_c(shutdown.clone()))
        .await?;

    shutdown.cancel();
    poller.await?;
    Ok(())
}

/// Resolves on Ctrl-C and tells the poller to stop.
async fn wait_for_ctrl_c(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a signal handler the server runs until killed.
        tracing::error!("Cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
    shutdown.cancel();
}
