//! # Mock Price Feed
//!
//! An aggregator-style price oracle used when FundMe runs on a local network
//! or inside unit tests. It reports rounds of `(answer, decimals)` the same
//! way a production USD feed does, but lets anyone push new answers.
//!
//! ## Storage
//!
//! | Key             | Tier       | Type        | Description                  |
//! |-----------------|------------|-------------|------------------------------|
//! | `Decimals`      | Instance   | `u32`       | Precision of every answer    |
//! | `LatestRound`   | Instance   | `u64`       | Id of the most recent round  |
//! | `Round(id)`     | Persistent | `RoundData` | Historical round data        |

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, contracttype, Env, String};


/// Decimals used by the local USD feed.
pub const DECIMALS: u32 = 8;
/// 2000 USD per unit of native currency, expressed with [`DECIMALS`].
pub const INITIAL_ANSWER: i128 = 200_000_000_000;
/// Interface version reported by `version()`.
pub const VERSION: u32 = 0;

const DAY_IN_LEDGERS: u32 = 17_280;
const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;
const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum FeedError {
    AlreadyInitialized = 1,
    NotInitialized     = 2,
    RoundNotFound      = 3,
    RoundIdOverflow    = 4,
}

/// One reported price round.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoundData {
    pub round_id: u64,
    /// Price of one unit of the base asset, scaled by `decimals()`.
    pub answer: i128,
    pub started_at: u64,
    pub updated_at: u64,
    pub answered_in_round: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Decimals,
    LatestRound,
    Round(u64),
}

#[contract]
pub struct MockPriceFeed;

#[contractimpl]
impl MockPriceFeed {
    /// Set the feed precision and publish round 1 with `initial_answer`.
    pub fn init(env: Env, decimals: u32, initial_answer: i128) -> Result<(), FeedError> {
        if env.storage().instance().has(&DataKey::Decimals) {
            return Err(FeedError::AlreadyInitialized);
        }
        env.storage().instance().set(&DataKey::Decimals, &decimals);
        Self::update_answer(env, initial_answer)
    }

    /// Publish a new round carrying `answer`, stamped with the current ledger time.
    pub fn update_answer(env: Env, answer: i128) -> Result<(), FeedError> {
        require_initialized(&env)?;
        let round_id = latest_round_id(&env)
            .unwrap_or(0)
            .checked_add(1)
            .ok_or(FeedError::RoundIdOverflow)?;
        let now = env.ledger().timestamp();
        save_round(&env, round_id, answer, now, now);
        Ok(())
    }

    /// Overwrite (or create) a specific round and make it the latest one.
    pub fn update_round_data(
        env: Env,
        round_id: u64,
        answer: i128,
        timestamp: u64,
        started_at: u64,
    ) -> Result<(), FeedError> {
        require_initialized(&env)?;
        save_round(&env, round_id, answer, timestamp, started_at);
        Ok(())
    }

    pub fn decimals(env: Env) -> Result<u32, FeedError> {
        bump_instance(&env);
        env.storage()
            .instance()
            .get(&DataKey::Decimals)
            .ok_or(FeedError::NotInitialized)
    }

    pub fn description(env: Env) -> String {
        String::from_str(&env, "MockPriceFeed")
    }

    pub fn version(_env: Env) -> u32 {
        VERSION
    }

    pub fn get_round_data(env: Env, round_id: u64) -> Result<RoundData, FeedError> {
        let key = DataKey::Round(round_id);
        let round: RoundData = env
            .storage()
            .persistent()
            .get(&key)
            .ok_or(FeedError::RoundNotFound)?;
        bump_persistent(&env, &key);
        Ok(round)
    }

    pub fn latest_round_data(env: Env) -> Result<RoundData, FeedError> {
        let round_id = latest_round_id(&env).ok_or(FeedError::NotInitialized)?;
        Self::get_round_data(env, round_id)
    }

    pub fn latest_answer(env: Env) -> Result<i128, FeedError> {
        Ok(Self::latest_round_data(env)?.answer)
    }

    pub fn latest_round(env: Env) -> Result<u64, FeedError> {
        latest_round_id(&env).ok_or(FeedError::NotInitialized)
    }

    pub fn latest_timestamp(env: Env) -> Result<u64, FeedError> {
        Ok(Self::latest_round_data(env)?.updated_at)
    }
}

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

fn require_initialized(env: &Env) -> Result<(), FeedError> {
    if env.storage().instance().has(&DataKey::Decimals) {
        Ok(())
    } else {
        Err(FeedError::NotInitialized)
    }
}

fn latest_round_id(env: &Env) -> Option<u64> {
    bump_instance(env);
    env.storage().instance().get(&DataKey::LatestRound)
}

fn save_round(env: &Env, round_id: u64, answer: i128, updated_at: u64, started_at: u64) {
    let key = DataKey::Round(round_id);
    let round = RoundData {
        round_id,
        answer,
        started_at,
        updated_at,
        answered_in_round: round_id,
    };
    env.storage().persistent().set(&key, &round);
    bump_persistent(env, &key);
    env.storage().instance().set(&DataKey::LatestRound, &round_id);
    bump_instance(env);
}
