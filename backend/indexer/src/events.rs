//! Event types emitted by the FundMe contract, as seen by the indexer.
//!
//! These mirror the contract events in `contracts/fund_me/src/events.rs`.

use serde::{Deserialize, Serialize};

/// All recognised event kinds from the FundMe contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A contribution was accepted (`funded` topic).
    Funded,
    /// The owner drained the ledger (`withdrawn` topic).
    Withdrawn,
    /// An event from this contract that we don't recognise.
    Unknown,
}

impl EventKind {
    /// Parse the leading topic symbol into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "funded" => Self::Funded,
            "withdrawn" => Self::Withdrawn,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Funded => "funded",
            Self::Withdrawn => "withdrawn",
            Self::Unknown => "unknown",
        }
    }
}

/// A decoded FundMe event, ready to be stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundMeEvent {
    /// Stable identifier used for idempotent inserts.
    pub event_id: String,
    pub event_type: String,
    /// Funder for `funded`, owner for `withdrawn`.
    pub account: Option<String>,
    /// Smallest currency units, kept as text since it is an `i128` on-chain.
    pub amount: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// An event row as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_id: String,
    pub event_type: String,
    pub account: Option<String>,
    pub amount: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}

/// Sum the amounts of `records`, skipping rows whose amount is missing or
/// not a valid integer.
pub fn sum_amounts(records: &[EventRecord]) -> i128 {
    records
        .iter()
        .filter_map(|r| r.amount.as_deref())
        .filter_map(|a| a.parse::<i128>().ok())
        .fold(0i128, |acc, a| acc.saturating_add(a))
}
