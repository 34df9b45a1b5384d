use solana_sdk::{pubkey, pubkey::Pubkey};

/// Compute unit limit requested for a direct-withdraw transaction.
pub const DIRECT_WITHDRAW_COMPUTE_UNITS: u32 = 800_000;

/// Maximum number of keys per `getMultipleAccounts` request.
pub const MAX_MULTIPLE_ACCOUNTS: usize = 100;

// https://github.com/Kamino-Finance/klend-sdk (KVAULTS_PROGRAM_ID / DEFAULT_KLEND_PROGRAM_ID)
pub const KAMINO_VAULTS_PROGRAM_ID: Pubkey = pubkey!("KvauGMspG5k6rtzrqqn7WNn3oZdyKqLKwK2XWQ8FLjd");
pub const KAMINO_LEND_PROGRAM_ID: Pubkey = pubkey!("KLend2g3cP87fffoy8q1mQqGKjrxjC8boSyAYavgmjD");

pub const KAMINO_SHARES_SEED: &[u8] = b"shares";
pub const KAMINO_TOKEN_VAULT_SEED: &[u8] = b"token_vault";
pub const KAMINO_BASE_AUTHORITY_SEED: &[u8] = b"authority";
pub const KAMINO_CTOKEN_VAULT_SEED: &[u8] = b"ctoken_vault";
pub const KAMINO_LENDING_MARKET_AUTHORITY_SEED: &[u8] = b"lma";
pub const KAMINO_RESERVE_LIQUIDITY_SUPPLY_SEED: &[u8] = b"reserve_liq_supply";
pub const KAMINO_RESERVE_COLLATERAL_MINT_SEED: &[u8] = b"reserve_coll_mint";
pub const EVENT_AUTHORITY_SEED: &[u8] = b"__event_authority";

pub const DRIFT_PROGRAM_ID: Pubkey = pubkey!("dRiftyHA39MWEi3m9aunc5MzRF1JYuBsbn6VPcn33UH");
pub const DRIFT_STATE: Pubkey = pubkey!("5zpq7DvB6UdFFvpmBPspGPNfUGoBRRCE2HHg5u3gxcsN");
pub const DRIFT_LOOKUP_TABLE: Pubkey = pubkey!("Fpys8GRa5RBWfyeN7AaDUwFGD1zkDCA4z3t4CJLV8dfL");

pub const DRIFT_SIGNER_SEED: &[u8] = b"drift_signer";
pub const DRIFT_USER_SEED: &[u8] = b"user";
pub const DRIFT_USER_STATS_SEED: &[u8] = b"user_stats";
pub const DRIFT_SPOT_MARKET_SEED: &[u8] = b"spot_market";
pub const DRIFT_PERP_MARKET_SEED: &[u8] = b"perp_market";
/// Drift's USDC spot market, which settles every perp position.
pub const DRIFT_QUOTE_SPOT_MARKET_INDEX: u16 = 0;

pub const JUPITER_LEND_PROGRAM_ID: Pubkey = pubkey!("jup3YeL8QhtSx1e253b2FDvsMNC87fDrgQZivbrndc9");
pub const JUPITER_LIQUIDITY_PROGRAM_ID: Pubkey = pubkey!("jupeiUmn818Jg1ekPURTpr4mFo29p46vygyykFJ3wZC");
pub const JUPITER_REWARDS_RATE_PROGRAM_ID: Pubkey = pubkey!("jup7TthsMgcR9Y3L277b8Eo9uboVSmu1utkuXHNUKar");

pub const JUPITER_F_TOKEN_MINT_SEED: &[u8] = b"f_token_mint";
pub const JUPITER_LENDING_ADMIN_SEED: &[u8] = b"lending_admin";
pub const JUPITER_RESERVE_SEED: &[u8] = b"reserve";
pub const JUPITER_RATE_MODEL_SEED: &[u8] = b"rate_model";
pub const JUPITER_USER_CLAIM_SEED: &[u8] = b"user_claim";
pub const JUPITER_LIQUIDITY_SEED: &[u8] = b"liquidity";
pub const JUPITER_REWARDS_RATE_MODEL_SEED: &[u8] = b"lending_rewards_rate_model";
pub const JUPITER_USER_SUPPLY_POSITION_SEED: &[u8] = b"user_supply_position";

// Built-in direct-withdraw configuration for the mainnet USDC vault.
pub const MAINNET_USDC_VAULT: Pubkey = pubkey!("8oUwteX3SJELMGDPTEuLqz1WSd58yMdkQ6s4hKwB42nJ");
pub const MAINNET_USDC_VAULT_LOOKUP_TABLE: Pubkey = pubkey!("5UCZAkmBCfrU7qDzKZ5UiBL9JupUFftW2xMt2Eex6xop");
pub const KAMINO_TURBO_USDC_STRATEGY: Pubkey = pubkey!("A3hTCWdnfV6uiQLxRmnv17EpiEtmc93v1AGQnWy44Mup");
pub const KAMINO_ADAPTOR_PROGRAM_ID: Pubkey = pubkey!("to6Eti9CsC5FGkAtqiPphvKD2hiQiLsS8zWiDBqBPKR");
pub const DRIFT_MAIN_USDC_STRATEGY: Pubkey = pubkey!("GXWqPpjQpdz7KZw9p7f5PX2eGxHAhvpNXiviFkAB8zXg");
pub const DRIFT_JLP_USDC_STRATEGY: Pubkey = pubkey!("TMoWTkuPJHArEeohUTWy3RYoMgfWqeCpzjPTLeGVYP9");
pub const DRIFT_ADAPTOR_PROGRAM_ID: Pubkey = pubkey!("EBN93eXs5fHGBABuajQqdsKRkCgaqtJa8vEFD6vKXiP");
pub const JUPITER_LEND_USDC_STRATEGY: Pubkey = pubkey!("2vVYHYM8VYnvZqQWpTJSj8o8DBf1wM8pVs3bsTgYZiqJ");
pub const JUPITER_ADAPTOR_PROGRAM_ID: Pubkey = pubkey!("EW35URAx3LiM13fFK3QxAXfGemHso9HWPixrv7YDY4AM");
