//! Failures the indexer can hit while talking to the RPC node or SQLite.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("sqlite: {0}")]
    Database(#[from] sqlx::Error),

    #[error("running migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Transport-level failure reaching the RPC node.
    #[error("rpc transport: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bad configuration: {0}")]
    Config(String),

    /// JSON-RPC error object returned by the node.
    #[error("rpc returned {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("unexpected getEvents payload: {0}")]
    EventParse(String),
}

pub type Result<T> = std::result::Result<T, IndexerError>;
