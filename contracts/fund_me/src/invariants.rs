#![allow(dead_code)]

extern crate std;

use soroban_sdk::Address;

use crate::test_utils::TestEnv;
use crate::LedgerConfig;

/// INV-1: the ledger's token balance equals the sum of all funder records,
/// provided every unit entered through `fund`.
pub fn assert_balance_matches_records(t: &TestEnv) {
    let count = t.client.get_funders_count();
    let mut sum = 0i128;
    for i in 0..count {
        let funder = t.client.get_funder(&i);
        sum += t.client.get_address_to_amount_funded(&funder);
    }
    let balance = t.token.balance(&t.client.address);
    assert_eq!(
        balance, sum,
        "INV-1 violated: ledger holds {} but funder records sum to {}",
        balance, sum
    );
    assert_eq!(t.client.get_balance(), balance);
}

/// INV-2: the funder list never holds the same account twice in one cycle.
pub fn assert_funders_unique(t: &TestEnv) {
    let count = t.client.get_funders_count();
    for i in 0..count {
        for j in (i + 1)..count {
            assert_ne!(
                t.client.get_funder(&i),
                t.client.get_funder(&j),
                "INV-2 violated: funder listed at both {} and {}",
                i,
                j
            );
        }
    }
}

/// INV-3: every listed funder has a positive record.
pub fn assert_listed_funders_have_records(t: &TestEnv) {
    for i in 0..t.client.get_funders_count() {
        let funder = t.client.get_funder(&i);
        assert!(
            t.client.get_address_to_amount_funded(&funder) > 0,
            "INV-3 violated: funder at {} has no record",
            i
        );
    }
}

/// INV-4: after a withdrawal the ledger is empty and every record reads zero.
pub fn assert_cycle_cleared(t: &TestEnv, funders: &[Address]) {
    assert_eq!(t.token.balance(&t.client.address), 0, "INV-4 violated: balance left");
    assert_eq!(t.client.get_funders_count(), 0, "INV-4 violated: funders left");
    for funder in funders {
        assert_eq!(
            t.client.get_address_to_amount_funded(funder),
            0,
            "INV-4 violated: record not reset"
        );
    }
}

/// INV-5: a successful fund increases the funder's record by exactly `amount`.
pub fn assert_fund_invariant(record_before: i128, record_after: i128, amount: i128) {
    assert_eq!(
        record_after,
        record_before + amount,
        "INV-5 violated: {} + {} != {}",
        record_before,
        amount,
        record_after
    );
}

/// INV-6: the configuration never changes after `init`.
pub fn assert_config_unchanged(t: &TestEnv, original: &LedgerConfig) {
    assert_eq!(t.client.get_owner(), original.owner, "INV-6 violated: owner changed");
    assert_eq!(
        t.client.get_price_feed(),
        original.price_feed,
        "INV-6 violated: price feed changed"
    );
    assert_eq!(
        t.client.get_native_token(),
        original.native_token,
        "INV-6 violated: native token changed"
    );
    assert_eq!(
        t.client.get_minimum_usd(),
        original.minimum_usd,
        "INV-6 violated: minimum changed"
    );
}

/// Run all stateless ledger invariants.
pub fn assert_all_ledger_invariants(t: &TestEnv) {
    assert_balance_matches_records(t);
    assert_funders_unique(t);
    assert_listed_funders_have_records(t);
}

pub fn config_of(t: &TestEnv) -> LedgerConfig {
    LedgerConfig {
        owner: t.client.get_owner(),
        price_feed: t.client.get_price_feed(),
        native_token: t.client.get_native_token(),
        minimum_usd: t.client.get_minimum_usd(),
    }
}
