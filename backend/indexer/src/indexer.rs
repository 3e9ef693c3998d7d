//! Polling loop feeding FundMe events from Soroban RPC into SQLite.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::db;
use crate::errors::Result;
use crate::rpc;

pub struct IndexerState {
    pub pool: SqlitePool,
    pub config: Config,
    pub client: Client,
}

/// Where the next `getEvents` request starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub ledger: u32,
    /// Pagination token; takes precedence over `ledger` while set.
    pub cursor: Option<String>,
}

impl Checkpoint {
    /// Resume from the stored checkpoint, or from `start_ledger` on a fresh database.
    pub async fn load(pool: &SqlitePool, start_ledger: u32) -> Result<Self> {
        let stored = db::get_last_ledger(pool).await?;
        let cursor = db::get_cursor_string(pool).await?;
        let ledger = u32::try_from(stored)
            .ok()
            .filter(|l| *l > 0)
            .unwrap_or(start_ledger);
        Ok(Self { ledger, cursor })
    }

    /// The checkpoint after a page ending at `latest_ledger`. Never moves backwards.
    pub fn advance(&self, latest_ledger: Option<u64>, cursor: Option<String>) -> Self {
        let ledger = latest_ledger
            .and_then(|l| u32::try_from(l).ok())
            .map_or(self.ledger, |l| l.max(self.ledger));
        Self { ledger, cursor }
    }
}

/// Poll until `shutdown` is cancelled. Failed polls are logged and retried
/// on the next tick from the same checkpoint.
pub async fn run(state: Arc<IndexerState>, shutdown: CancellationToken) {
    let mut checkpoint = match Checkpoint::load(&state.pool, state.config.start_ledger).await {
        Ok(checkpoint) => checkpoint,
        Err(e) => {
            warn!("Cannot read stored checkpoint, starting from config: {e}");
            Checkpoint {
                ledger: state.config.start_ledger,
                cursor: None,
            }
        }
    };
    info!(
        contract = %state.config.contract_id,
        ledger = checkpoint.ledger,
        "Indexer started"
    );

    let interval = Duration::from_secs(state.config.poll_interval_secs);
    loop {
        match poll_once(&state, &checkpoint).await {
            Ok(next) => checkpoint = next,
            Err(e) => warn!(ledger = checkpoint.ledger, "Poll failed: {e}"),
        }

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
    info!(ledger = checkpoint.ledger, "Indexer stopped");
}

/// Fetch one page, store what decodes, and persist the resulting checkpoint.
async fn poll_once(state: &IndexerState, from: &Checkpoint) -> Result<Checkpoint> {
    let config = &state.config;
    let (raw_events, next_cursor, latest_ledger) = rpc::fetch_events(
        &state.client,
        &config.rpc_url,
        &config.contract_id,
        from.ledger,
        from.cursor.as_deref(),
        config.events_per_page,
    )
    .await?;

    if !raw_events.is_empty() {
        let decoded = rpc::decode_events(&raw_events, &config.contract_id);
        let stored = db::insert_events(&state.pool, &decoded).await?;
        debug!(
            fetched = raw_events.len(),
            decoded = decoded.len(),
            stored,
            "Page indexed"
        );
    }

    let next = from.advance(latest_ledger, next_cursor);
    db::save_cursor(&state.pool, i64::from(next.ledger), next.cursor.as_deref()).await?;
    Ok(next)
}
