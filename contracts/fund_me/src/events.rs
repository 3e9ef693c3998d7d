//! Contract events emitted by FundMe.
//!
//! | Topic                       | Data        |
//! |-----------------------------|-------------|
//! | `("funded", funder)`        | [`Funded`]  |
//! | `("withdrawn", owner)`      | [`Withdrawn`] |
//!
//! The off-chain indexer keys on the leading symbol of each topic.

use soroban_sdk::{contracttype, symbol_short, Address, Env};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Funded {
    pub funder: Address,
    pub amount: i128,
    /// The funder's cumulative contribution in the current cycle.
    pub total_funded: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Withdrawn {
    pub owner: Address,
    pub amount: i128,
    pub funders_cleared: u32,
}

pub fn publish_funded(env: &Env, funder: &Address, amount: i128, total_funded: i128) {
    env.events().publish(
        (symbol_short!("funded"), funder.clone()),
        Funded {
            funder: funder.clone(),
            amount,
            total_funded,
        },
    );
}

pub fn publish_withdrawn(env: &Env, owner: &Address, amount: i128, funders_cleared: u32) {
    env.events().publish(
        (symbol_short!("withdrawn"), owner.clone()),
        Withdrawn {
            owner: owner.clone(),
            amount,
            funders_cleared,
        },
    );
}
