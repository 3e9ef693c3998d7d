extern crate std;

use mock_price_feed::{MockPriceFeed, MockPriceFeedClient, DECIMALS, INITIAL_ANSWER};
use soroban_sdk::{testutils::Address as _, token, Address, Env};

use crate::{FundMe, FundMeClient, DEFAULT_MINIMUM_USD};

/// One whole unit of a Stellar asset (7 decimals).
pub const ONE_UNIT: i128 = 10_000_000;
/// One USD on the ledger's 18-decimal scale.
pub const ONE_USD: i128 = 1_000_000_000_000_000_000;

pub struct TestEnv<'a> {
    pub env: Env,
    pub owner: Address,
    pub client: FundMeClient<'a>,
    pub feed: MockPriceFeedClient<'a>,
    pub token: token::Client<'a>,
    pub token_sac: token::StellarAssetClient<'a>,
}

impl<'a> TestEnv<'a> {
    /// Generate an account holding `amount` of the native token.
    pub fn funded_account(&self, amount: i128) -> Address {
        let account = Address::generate(&self.env);
        self.token_sac.mint(&account, &amount);
        account
    }
}

/// Register the mock feed (2000 USD per unit), a native token and an
/// uninitialised FundMe.
pub fn setup_uninitialized<'a>() -> TestEnv<'a> {
    let env = Env::default();
    env.mock_all_auths();

    let feed_id = env.register(MockPriceFeed, ());
    let feed = MockPriceFeedClient::new(&env, &feed_id);
    feed.init(&DECIMALS, &INITIAL_ANSWER);

    let token_admin = Address::generate(&env);
    let sac = env.register_stellar_asset_contract_v2(token_admin);
    let token = token::Client::new(&env, &sac.address());
    let token_sac = token::StellarAssetClient::new(&env, &sac.address());

    let contract_id = env.register(FundMe, ());
    let client = FundMeClient::new(&env, &contract_id);
    let owner = Address::generate(&env);

    TestEnv {
        env,
        owner,
        client,
        feed,
        token,
        token_sac,
    }
}

/// Same as [`setup_uninitialized`], with FundMe initialised at the default minimum.
pub fn setup<'a>() -> TestEnv<'a> {
    let t = setup_uninitialized();
    t.client.init(
        &t.owner,
        &t.feed.address,
        &t.token.address,
        &DEFAULT_MINIMUM_USD,
    );
    t
}
