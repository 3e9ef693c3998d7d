//! Native currency → USD conversion.
//!
//! Feeds report prices with few decimals (8 for USD pairs) while the native
//! currency is counted in its smallest unit (7 decimals for a Stellar asset).
//! Both are brought onto an 18-decimal USD scale before comparison:
//!
//! ```text
//! usd = amount * answer * 10^(18 - feed_decimals) / 10^token_decimals
//! ```
//!
//! The amount is split into whole units and a sub-unit remainder so the
//! intermediate products stay near the size of the result. An overflow
//! therefore means the USD value itself does not fit in an `i128`.

use soroban_sdk::{token, Address, Env};

use crate::price_feed::PriceFeedClient;
use crate::types::LedgerConfig;
use crate::Error;

/// Decimals of every USD value the ledger works with.
pub const USD_DECIMALS: u32 = 18;

/// Move `value` from `from` decimals to `to` decimals. Downscaling truncates.
pub fn rescale(value: i128, from: u32, to: u32) -> Result<i128, Error> {
    if to >= from {
        let factor = 10i128
            .checked_pow(to - from)
            .ok_or(Error::ArithmeticOverflow)?;
        value.checked_mul(factor).ok_or(Error::ArithmeticOverflow)
    } else {
        let factor = 10i128
            .checked_pow(from - to)
            .ok_or(Error::ArithmeticOverflow)?;
        Ok(value / factor)
    }
}

/// USD value (18 decimals) of `amount` smallest units, given a feed answer.
pub fn usd_value(
    amount: i128,
    answer: i128,
    feed_decimals: u32,
    token_decimals: u32,
) -> Result<i128, Error> {
    if answer <= 0 {
        return Err(Error::InvalidPrice);
    }
    let unit = 10i128
        .checked_pow(token_decimals)
        .ok_or(Error::ArithmeticOverflow)?;
    let whole = amount / unit;
    let fraction = amount % unit;

    let whole_usd = whole
        .checked_mul(answer)
        .ok_or(Error::ArithmeticOverflow)
        .and_then(|v| rescale(v, feed_decimals, USD_DECIMALS))?;
    let fraction_decimals = feed_decimals
        .checked_add(token_decimals)
        .ok_or(Error::ArithmeticOverflow)?;
    let fraction_usd = fraction
        .checked_mul(answer)
        .ok_or(Error::ArithmeticOverflow)
        .and_then(|v| rescale(v, fraction_decimals, USD_DECIMALS))?;

    whole_usd
        .checked_add(fraction_usd)
        .ok_or(Error::ArithmeticOverflow)
}

/// Whether `amount` is worth at least `minimum` (18-decimal USD).
///
/// A positive amount at a positive price can only overflow upwards, so a
/// value too large for `i128` clears any minimum.
pub fn meets_minimum(
    amount: i128,
    answer: i128,
    feed_decimals: u32,
    token_decimals: u32,
    minimum: i128,
) -> Result<bool, Error> {
    if amount <= 0 {
        return Ok(false);
    }
    match usd_value(amount, answer, feed_decimals, token_decimals) {
        Ok(usd) => Ok(usd >= minimum),
        Err(Error::ArithmeticOverflow) if 10i128.checked_pow(token_decimals).is_some() => Ok(true),
        Err(e) => Err(e),
    }
}

/// Latest `(answer, decimals)` reported by `feed`.
///
/// A feed that fails to answer is reported as `InvalidPrice`.
pub fn get_price(env: &Env, feed: &Address) -> Result<(i128, u32), Error> {
    let client = PriceFeedClient::new(env, feed);
    let round = match client.try_latest_round_data() {
        Ok(Ok(round)) => round,
        _ => return Err(Error::InvalidPrice),
    };
    let decimals = match client.try_decimals() {
        Ok(Ok(decimals)) => decimals,
        _ => return Err(Error::InvalidPrice),
    };
    Ok((round.answer, decimals))
}

/// `(answer, feed_decimals, token_decimals)` for the configured feed and token.
fn market(env: &Env, config: &LedgerConfig) -> Result<(i128, u32, u32), Error> {
    let (answer, feed_decimals) = get_price(env, &config.price_feed)?;
    let token_decimals = token::Client::new(env, &config.native_token).decimals();
    Ok((answer, feed_decimals, token_decimals))
}

/// USD value (18 decimals) of `amount` at the configured feed's latest price.
pub fn get_conversion_rate(env: &Env, config: &LedgerConfig, amount: i128) -> Result<i128, Error> {
    let (answer, feed_decimals, token_decimals) = market(env, config)?;
    usd_value(amount, answer, feed_decimals, token_decimals)
}

/// Fail with `InsufficientValue` unless `amount` reaches the configured minimum.
pub fn check_minimum(env: &Env, config: &LedgerConfig, amount: i128) -> Result<(), Error> {
    let (answer, feed_decimals, token_decimals) = market(env, config)?;
    if meets_minimum(amount, answer, feed_decimals, token_decimals, config.minimum_usd)? {
        Ok(())
    } else {
        Err(Error::InsufficientValue)
    }
}
