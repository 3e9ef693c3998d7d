//! # Storage
//!
//! Typed helpers over the two Soroban storage tiers used by FundMe.
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key           | Type           | Description                          |
//! |---------------|----------------|--------------------------------------|
//! | `Config`      | `LedgerConfig` | Owner, price feed, token, minimum    |
//! | `Cycle`       | `u32`          | Current funding cycle (absent = 0)   |
//! | `FunderCount` | `u32`          | Funders listed in the current cycle  |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                            | Type      | Description                         |
//! |--------------------------------|-----------|-------------------------------------|
//! | `Funder(cycle, index)`         | `Address` | `index`-th funder of `cycle`        |
//! | `AmountFunded(cycle, address)` | `i128`    | Contribution of `address` in `cycle`|
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.
//!
//! Funder records are keyed by cycle. Starting a new cycle only rewrites the
//! two instance counters, so `withdraw` touches the same number of entries
//! however many accounts funded. Records of past cycles are never read again
//! and expire with their TTL.

use soroban_sdk::{contracttype, Address, Env};

use crate::types::LedgerConfig;
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Immutable ledger configuration (Instance).
    Config,
    /// Current funding cycle (Instance).
    Cycle,
    /// Number of funders listed in the current cycle (Instance).
    FunderCount,
    /// Funder at a position of a cycle's list (Persistent).
    Funder(u32, u32),
    /// Cumulative contribution of an account in a cycle (Persistent).
    AmountFunded(u32, Address),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

pub fn save_config(env: &Env, config: &LedgerConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    bump_instance(env);
}

/// Load the ledger configuration, failing with `NotInitialized` before `init`.
pub fn load_config(env: &Env) -> Result<LedgerConfig, Error> {
    let config = env
        .storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(Error::NotInitialized)?;
    bump_instance(env);
    Ok(config)
}

pub fn current_cycle(env: &Env) -> u32 {
    env.storage().instance().get(&DataKey::Cycle).unwrap_or(0)
}

pub fn load_funders_count(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get(&DataKey::FunderCount)
        .unwrap_or(0)
}

/// Close the current cycle. Returns how many funders it listed.
pub fn start_new_cycle(env: &Env) -> Result<u32, Error> {
    let listed = load_funders_count(env);
    let next = current_cycle(env)
        .checked_add(1)
        .ok_or(Error::ArithmeticOverflow)?;
    env.storage().instance().set(&DataKey::Cycle, &next);
    env.storage().instance().set(&DataKey::FunderCount, &0u32);
    bump_instance(env);
    Ok(listed)
}

// ── Persistent Storage Helpers ───────────────────────────────────────

/// Extend the TTL of a persistent key. The key must exist.
fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// The funder at `index` of the current cycle.
pub fn load_funder(env: &Env, index: u32) -> Option<Address> {
    if index >= load_funders_count(env) {
        return None;
    }
    let key = DataKey::Funder(current_cycle(env), index);
    let funder = env.storage().persistent().get(&key)?;
    bump_persistent(env, &key);
    Some(funder)
}

/// Append `funder` to the current cycle's list.
pub fn push_funder(env: &Env, funder: &Address) -> Result<(), Error> {
    let index = load_funders_count(env);
    let key = DataKey::Funder(current_cycle(env), index);
    env.storage().persistent().set(&key, funder);
    bump_persistent(env, &key);

    let count = index.checked_add(1).ok_or(Error::ArithmeticOverflow)?;
    env.storage().instance().set(&DataKey::FunderCount, &count);
    bump_instance(env);
    Ok(())
}

pub fn load_amount_funded(env: &Env, funder: &Address) -> i128 {
    let key = DataKey::AmountFunded(current_cycle(env), funder.clone());
    match env.storage().persistent().get(&key) {
        Some(amount) => {
            bump_persistent(env, &key);
            amount
        }
        None => 0,
    }
}

pub fn save_amount_funded(env: &Env, funder: &Address, amount: i128) {
    let key = DataKey::AmountFunded(current_cycle(env), funder.clone());
    env.storage().persistent().set(&key, &amount);
    bump_persistent(env, &key);
}
