//! # Types
//!
//! Shared data structures for the FundMe ledger.
//!
//! ## Config / bookkeeping split
//!
//! The ledger keeps two kinds of state:
//!
//! - [`LedgerConfig`] — written once by `init`; never mutated.
//! - Funder bookkeeping (per-account amounts and the funder list) — written on
//!   every `fund` under the current cycle; `withdraw` moves to a fresh cycle.
//!
//! ## Lifecycle
//!
//! ```text
//!            fund (ok)             fund (ok)
//!   Empty ─────────────► Funded ◄──────────┐
//!     ▲                    │ └─────────────┘
//!     └──── withdraw ──────┘
//! ```
//!
//! A rejected `fund` leaves the ledger in whatever state it was in, and
//! `withdraw` on an `Empty` ledger is a no-op drain of a zero balance.

use soroban_sdk::{contracttype, Address};

/// Immutable ledger configuration, written once at `init`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LedgerConfig {
    /// The only account allowed to withdraw.
    pub owner: Address,
    /// Oracle reporting the USD price of one unit of `native_token`.
    pub price_feed: Address,
    /// Stellar Asset Contract of the currency the ledger accepts.
    pub native_token: Address,
    /// Smallest accepted contribution, in USD with 18 decimals.
    pub minimum_usd: i128,
}
