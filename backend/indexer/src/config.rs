//! Indexer configuration loaded from environment variables.

use std::str::FromStr;

use crate::errors::{IndexerError, Result};

const DEFAULT_RPC_URL: &str = "https://soroban-testnet.stellar.org";
const DEFAULT_DATABASE_URL: &str = "sqlite:./fund_me_events.db";

#[derive(Debug, Clone)]
pub struct Config {
    /// Soroban RPC endpoint
    pub rpc_url: String,
    /// The FundMe contract address (Strkey format)
    pub contract_id: String,
    /// SQLite database URL or path
    pub database_url: String,
    /// Port for the REST API server
    pub api_port: u16,
    /// Seconds between two `getEvents` polls
    pub poll_interval_secs: u64,
    /// Maximum number of events requested per page
    pub events_per_page: u32,
    /// Ledger to start from when no cursor has been saved
    pub start_ledger: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let contract_id = lookup("CONTRACT_ID").ok_or_else(|| {
            IndexerError::Config("CONTRACT_ID environment variable is required".to_string())
        })?;

        Ok(Config {
            rpc_url: lookup("RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_string()),
            contract_id,
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            api_port: parse_or(&lookup, "API_PORT", 3001)?,
            poll_interval_secs: parse_or(&lookup, "POLL_INTERVAL_SECS", 5)?,
            events_per_page: parse_or(&lookup, "EVENTS_PER_PAGE", 100)?,
            start_ledger: parse_or(&lookup, "START_LEDGER", 0)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| IndexerError::Config(format!("Invalid {key}: {raw}"))),
        None => Ok(default),
    }
}
