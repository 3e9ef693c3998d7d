//! Client side of the price oracle FundMe reads from.
//!
//! Any contract exposing these entry points can back a ledger; locally that
//! is `mock_price_feed::MockPriceFeed`.

use soroban_sdk::{contractclient, contracttype, Env, String};

/// One reported price round, as returned by `latest_round_data`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoundData {
    pub round_id: u64,
    /// USD price of one unit of the native currency, scaled by `decimals()`.
    pub answer: i128,
    pub started_at: u64,
    pub updated_at: u64,
    pub answered_in_round: u64,
}

#[contractclient(name = "PriceFeedClient")]
pub trait PriceFeedInterface {
    fn decimals(env: Env) -> u32;
    fn description(env: Env) -> String;
    fn version(env: Env) -> u32;
    fn latest_round_data(env: Env) -> RoundData;
}
