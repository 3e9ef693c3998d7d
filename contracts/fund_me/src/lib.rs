//! # FundMe Contract
//!
//! A funding ledger that accepts contributions in a native currency from any
//! account, as long as each contribution is worth at least a configured USD
//! amount according to an external price feed. Only the owner can withdraw,
//! and a withdrawal drains the whole balance and starts a new funding cycle.
//!
//! | Phase     | Entry Point(s)                                             |
//! |-----------|------------------------------------------------------------|
//! | Bootstrap | [`FundMe::init`]                                           |
//! | Funding   | [`FundMe::fund`]                                           |
//! | Draining  | [`FundMe::withdraw`]                                       |
//! | Queries   | `get_price_feed`, `get_owner`, `get_address_to_amount_funded`, `get_funder`, ... |
//!
//! ## Architecture
//!
//! Storage access is delegated to [`storage`], USD conversion to
//! [`price_converter`] and event emission to [`events`]. This file holds the
//! entry points and the ordering rules between bookkeeping and transfers.
//!
//! ## Deployment
//!
//! `init` is open until its first successful call. Deploy and initialise in
//! the same transaction, otherwise any account can call `init` first and
//! become the owner.
//!
//! ## Funding cycles
//!
//! Funder records live under the current cycle number. `withdraw` advances
//! the cycle *before* transferring the balance out, which makes every record
//! read as zero and empties the funder list at a fixed storage cost. If the
//! transfer fails the entry point returns [`Error::TransferFailed`] and the
//! host discards every write of the call.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, token, Address, Env};

mod events;
mod price_converter;
mod price_feed;
mod storage;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_utils;
#[cfg(test)]
mod test_withdraw;

pub use events::{Funded, Withdrawn};
pub use price_converter::USD_DECIMALS;
pub use price_feed::{PriceFeedClient, RoundData};
pub use types::LedgerConfig;

/// Minimum contribution, in whole USD, used by deployments that have no
/// reason to pick another value.
pub const DEFAULT_MINIMUM_USD: i128 = 50;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,
    NotInitialized     = 2,
    InsufficientValue  = 3,
    NotOwner           = 4,
    IndexOutOfRange    = 5,
    TransferFailed     = 6,
    InvalidPrice       = 7,
    ArithmeticOverflow = 8,
    InvalidConfig      = 9,
}

#[contract]
pub struct FundMe;

#[contractimpl]
impl FundMe {
    // ─────────────────────────────────────────────────────────
    // Initialisation
    // ─────────────────────────────────────────────────────────

    /// Bind the owner, price feed and accepted currency.
    ///
    /// - `owner` must sign and becomes the only account able to withdraw.
    /// - `minimum_usd` is in whole USD and must be positive.
    /// - Subsequent calls fail with `Error::AlreadyInitialized`.
    ///
    /// Must be submitted together with the deployment.
    pub fn init(
        env: Env,
        owner: Address,
        price_feed: Address,
        native_token: Address,
        minimum_usd: i128,
    ) -> Result<(), Error> {
        owner.require_auth();

        if storage::is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }
        if minimum_usd <= 0 {
            return Err(Error::InvalidConfig);
        }

        let config = LedgerConfig {
            owner,
            price_feed,
            native_token,
            minimum_usd: price_converter::rescale(minimum_usd, 0, USD_DECIMALS)?,
        };
        storage::save_config(&env, &config);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Funding
    // ─────────────────────────────────────────────────────────

    /// Contribute `amount` smallest units of the native currency.
    ///
    /// Fails with `Error::InsufficientValue` when `amount` is worth less than
    /// the configured minimum at the feed's latest price. A funder is
    /// appended to the funder list only on its first contribution of the
    /// current cycle.
    pub fn fund(env: Env, funder: Address, amount: i128) -> Result<(), Error> {
        funder.require_auth();

        let config = storage::load_config(&env)?;
        if amount <= 0 {
            return Err(Error::InsufficientValue);
        }
        price_converter::check_minimum(&env, &config, amount)?;

        let previous = storage::load_amount_funded(&env, &funder);
        let total = previous
            .checked_add(amount)
            .ok_or(Error::ArithmeticOverflow)?;
        if previous == 0 {
            storage::push_funder(&env, &funder)?;
        }
        storage::save_amount_funded(&env, &funder, total);

        let token_client = token::Client::new(&env, &config.native_token);
        token_client.transfer(&funder, &env.current_contract_address(), &amount);

        events::publish_funded(&env, &funder, amount, total);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Withdrawal
    // ─────────────────────────────────────────────────────────

    /// Send the whole balance to the owner and start a new funding cycle.
    ///
    /// Returns the amount transferred. Only the owner may call this; anyone
    /// else gets `Error::NotOwner`.
    pub fn withdraw(env: Env, caller: Address) -> Result<i128, Error> {
        caller.require_auth();

        let config = storage::load_config(&env)?;
        if caller != config.owner {
            return Err(Error::NotOwner);
        }

        // Bookkeeping reaches its terminal values before any funds move.
        let funders_cleared = storage::start_new_cycle(&env)?;

        let token_client = token::Client::new(&env, &config.native_token);
        let contract = env.current_contract_address();
        let balance = token_client.balance(&contract);
        if balance > 0 {
            match token_client.try_transfer(&contract, &config.owner, &balance) {
                Ok(Ok(())) => {}
                _ => return Err(Error::TransferFailed),
            }
        }

        events::publish_withdrawn(&env, &config.owner, balance, funders_cleared);
        Ok(balance)
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    pub fn get_owner(env: Env) -> Result<Address, Error> {
        Ok(storage::load_config(&env)?.owner)
    }

    pub fn get_price_feed(env: Env) -> Result<Address, Error> {
        Ok(storage::load_config(&env)?.price_feed)
    }

    pub fn get_native_token(env: Env) -> Result<Address, Error> {
        Ok(storage::load_config(&env)?.native_token)
    }

    /// The minimum contribution in USD with [`USD_DECIMALS`] decimals.
    pub fn get_minimum_usd(env: Env) -> Result<i128, Error> {
        Ok(storage::load_config(&env)?.minimum_usd)
    }

    /// Contribution of `account` in the current cycle; zero if it has not
    /// funded since the last withdrawal.
    pub fn get_address_to_amount_funded(env: Env, account: Address) -> i128 {
        storage::load_amount_funded(&env, &account)
    }

    /// The funder at `index` in the current cycle's funder list.
    pub fn get_funder(env: Env, index: u32) -> Result<Address, Error> {
        storage::load_funder(&env, index).ok_or(Error::IndexOutOfRange)
    }

    pub fn get_funders_count(env: Env) -> u32 {
        storage::load_funders_count(&env)
    }

    /// Number of withdrawals so far; each one starts a new funding cycle.
    pub fn get_funding_cycle(env: Env) -> u32 {
        storage::current_cycle(&env)
    }

    /// Native currency currently held by the ledger.
    pub fn get_balance(env: Env) -> Result<i128, Error> {
        let config = storage::load_config(&env)?;
        let token_client = token::Client::new(&env, &config.native_token);
        Ok(token_client.balance(&env.current_contract_address()))
    }

    /// Interface version of the configured price feed.
    pub fn get_version(env: Env) -> Result<u32, Error> {
        let config = storage::load_config(&env)?;
        Ok(PriceFeedClient::new(&env, &config.price_feed).version())
    }

    /// USD value, with [`USD_DECIMALS`] decimals, of `amount` at the latest price.
    pub fn get_conversion_rate(env: Env, amount: i128) -> Result<i128, Error> {
        let config = storage::load_config(&env)?;
        price_converter::get_conversion_rate(&env, &config, amount)
    }
}
