extern crate std;

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, testutils::Address as _, Address, Env,
};

use crate::invariants::{
    assert_all_ledger_invariants, assert_config_unchanged, assert_cycle_cleared, config_of,
};
use crate::test_utils::{setup, setup_uninitialized, ONE_UNIT};
use crate::{Error, DEFAULT_MINIMUM_USD};

#[test]
fn test_withdraw_returns_all_funds_to_owner() {
    let t = setup();
    t.token_sac.mint(&t.owner, &ONE_UNIT);
    t.client.fund(&t.owner, &ONE_UNIT);

    let starting_ledger_balance = t.token.balance(&t.client.address);
    let starting_owner_balance = t.token.balance(&t.owner);

    let withdrawn = t.client.withdraw(&t.owner);

    assert_eq!(withdrawn, starting_ledger_balance);
    assert_eq!(t.token.balance(&t.client.address), 0);
    assert_eq!(
        t.token.balance(&t.owner),
        starting_owner_balance + starting_ledger_balance
    );
    assert_cycle_cleared(&t, &[t.owner.clone()]);
}

#[test]
fn test_withdraw_with_multiple_funders() {
    let t = setup();
    let original = config_of(&t);

    let mut funders = std::vec::Vec::new();
    for _ in 0..5 {
        let funder = t.funded_account(ONE_UNIT);
        t.client.fund(&funder, &ONE_UNIT);
        funders.push(funder);
    }
    assert_all_ledger_invariants(&t);
    assert_eq!(t.client.get_funders_count(), 5);

    let starting_owner_balance = t.token.balance(&t.owner);
    let withdrawn = t.client.withdraw(&t.owner);

    assert_eq!(withdrawn, 5 * ONE_UNIT);
    assert_eq!(t.token.balance(&t.owner), starting_owner_balance + 5 * ONE_UNIT);
    assert_cycle_cleared(&t, &funders);
    assert_eq!(t.client.try_get_funder(&0), Err(Ok(Error::IndexOutOfRange)));
    assert_config_unchanged(&t, &original);
}

#[test]
fn test_only_owner_can_withdraw() {
    let t = setup();
    let funder = t.funded_account(ONE_UNIT);
    t.client.fund(&funder, &ONE_UNIT);

    let attacker = Address::generate(&t.env);
    let result = t.client.try_withdraw(&attacker);

    assert_eq!(result, Err(Ok(Error::NotOwner)));
    assert_eq!(t.client.get_balance(), ONE_UNIT);
    assert_eq!(t.client.get_address_to_amount_funded(&funder), ONE_UNIT);
    assert_eq!(t.client.get_funder(&0), funder);
    assert_eq!(t.token.balance(&attacker), 0);

    // A funder is not the owner either.
    assert_eq!(t.client.try_withdraw(&funder), Err(Ok(Error::NotOwner)));
    assert_all_ledger_invariants(&t);
}

#[test]
fn test_withdraw_on_empty_ledger_is_noop() {
    let t = setup();

    let withdrawn = t.client.withdraw(&t.owner);

    assert_eq!(withdrawn, 0);
    assert_eq!(t.token.balance(&t.owner), 0);
    assert_cycle_cleared(&t, &[]);
}

#[test]
fn test_ledger_reusable_after_withdraw() {
    let t = setup();
    let funder = t.funded_account(3 * ONE_UNIT);

    t.client.fund(&funder, &ONE_UNIT);
    assert_eq!(t.client.get_funding_cycle(), 0);
    t.client.withdraw(&t.owner);
    assert_eq!(t.client.get_funding_cycle(), 1);
    assert_cycle_cleared(&t, &[funder.clone()]);

    // The same account starts the next cycle and is listed again.
    t.client.fund(&funder, &(2 * ONE_UNIT));
    assert_eq!(t.client.get_funders_count(), 1);
    assert_eq!(t.client.get_funder(&0), funder);
    assert_eq!(t.client.get_address_to_amount_funded(&funder), 2 * ONE_UNIT);
    assert_all_ledger_invariants(&t);

    assert_eq!(t.client.withdraw(&t.owner), 2 * ONE_UNIT);
    assert_eq!(t.token.balance(&t.owner), 3 * ONE_UNIT);
}

/// Funds `funder_count` distinct accounts, withdraws, and reports the
/// ledger entries written by the withdrawal.
fn withdraw_write_entries(funder_count: u32) -> u32 {
    let t = setup();
    t.env.cost_estimate().budget().reset_unlimited();

    let mut funders = std::vec::Vec::new();
    for _ in 0..funder_count {
        let funder = t.funded_account(ONE_UNIT);
        t.client.fund(&funder, &ONE_UNIT);
        funders.push(funder);
    }

    t.client.withdraw(&t.owner);
    let written = t.env.cost_estimate().resources().write_entries;

    assert_eq!(t.token.balance(&t.owner), i128::from(funder_count) * ONE_UNIT);
    assert_cycle_cleared(&t, &funders);
    written
}

#[test]
fn test_withdraw_cost_does_not_grow_with_funders() {
    let few = withdraw_write_entries(3);
    let many = withdraw_write_entries(300);

    assert_eq!(few, many);
}

/// Token whose transfers to a blocked recipient fail, used to force a
/// payout failure inside `withdraw`.
#[contract]
pub struct PayoutBlockingToken;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum TokenError {
    RecipientBlocked    = 1,
    InsufficientBalance = 2,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TokenKey {
    Balance(Address),
    Blocked(Address),
}

#[contractimpl]
impl PayoutBlockingToken {
    pub fn mint(env: Env, to: Address, amount: i128) {
        let balance = Self::balance(env.clone(), to.clone());
        env.storage()
            .persistent()
            .set(&TokenKey::Balance(to), &(balance + amount));
    }

    pub fn set_blocked(env: Env, account: Address, blocked: bool) {
        env.storage()
            .persistent()
            .set(&TokenKey::Blocked(account), &blocked);
    }

    pub fn decimals(_env: Env) -> u32 {
        7
    }

    pub fn balance(env: Env, id: Address) -> i128 {
        env.storage()
            .persistent()
            .get(&TokenKey::Balance(id))
            .unwrap_or(0)
    }

    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) -> Result<(), TokenError> {
        from.require_auth();
        let blocked: bool = env
            .storage()
            .persistent()
            .get(&TokenKey::Blocked(to.clone()))
            .unwrap_or(false);
        if blocked {
            return Err(TokenError::RecipientBlocked);
        }
        let from_balance = Self::balance(env.clone(), from.clone());
        if from_balance < amount {
            return Err(TokenError::InsufficientBalance);
        }
        env.storage()
            .persistent()
            .set(&TokenKey::Balance(from), &(from_balance - amount));
        Self::mint(env, to, amount);
        Ok(())
    }
}

#[test]
fn test_failed_transfer_rolls_back_withdrawal() {
    let t = setup_uninitialized();
    let token_id = t.env.register(PayoutBlockingToken, ());
    let token = PayoutBlockingTokenClient::new(&t.env, &token_id);
    t.client
        .init(&t.owner, &t.feed.address, &token_id, &DEFAULT_MINIMUM_USD);

    let first = Address::generate(&t.env);
    let second = Address::generate(&t.env);
    token.mint(&first, &ONE_UNIT);
    token.mint(&second, &ONE_UNIT);
    t.client.fund(&first, &ONE_UNIT);
    t.client.fund(&second, &ONE_UNIT);

    // The owner can no longer receive the asset.
    token.set_blocked(&t.owner, &true);

    let result = t.client.try_withdraw(&t.owner);
    assert_eq!(result, Err(Ok(Error::TransferFailed)));

    // Nothing was reset.
    assert_eq!(t.client.get_funding_cycle(), 0);
    assert_eq!(token.balance(&t.client.address), 2 * ONE_UNIT);
    assert_eq!(t.client.get_balance(), 2 * ONE_UNIT);
    assert_eq!(t.client.get_funders_count(), 2);
    assert_eq!(t.client.get_funder(&0), first);
    assert_eq!(t.client.get_funder(&1), second);
    assert_eq!(t.client.get_address_to_amount_funded(&first), ONE_UNIT);
    assert_eq!(t.client.get_address_to_amount_funded(&second), ONE_UNIT);

    // Once the owner can receive again, the same funds drain normally.
    token.set_blocked(&t.owner, &false);
    assert_eq!(t.client.withdraw(&t.owner), 2 * ONE_UNIT);
    assert_eq!(token.balance(&t.owner), 2 * ONE_UNIT);
    assert_eq!(token.balance(&t.client.address), 0);
    assert_eq!(t.client.get_funders_count(), 0);
    assert_eq!(t.client.get_address_to_amount_funded(&first), 0);
    assert_eq!(t.client.get_address_to_amount_funded(&second), 0);
}
