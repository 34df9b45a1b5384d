use super::{external_unavailable, read_failed, ProtocolAccountResolver, ResolveContext};
use crate::{
    chain::ChainReader,
    constants::*,
    error::WithdrawError,
    layout::{has_discriminator, read_i64, read_pubkey, read_u16, read_u64, read_u8},
    state::RemainingAccountSet,
};
use async_trait::async_trait;
use log::debug;
use solana_sdk::{instruction::AccountMeta, pubkey::Pubkey};
use std::collections::BTreeSet;

// Drift User
pub const USER_SPOT_POSITIONS_OFFSET: usize = 104;
pub const SPOT_POSITION_SIZE: usize = 40;
pub const USER_PERP_POSITIONS_OFFSET: usize = 424;
pub const PERP_POSITION_SIZE: usize = 184;
pub const USER_POSITION_SLOTS: usize = 8;
pub const USER_MIN_LEN: usize = USER_PERP_POSITIONS_OFFSET + USER_POSITION_SLOTS * PERP_POSITION_SIZE;

// SpotPosition, relative to the slot
const SPOT_SCALED_BALANCE: usize = 0;
const SPOT_OPEN_BIDS: usize = 8;
const SPOT_OPEN_ASKS: usize = 16;
const SPOT_MARKET_INDEX: usize = 32;
const SPOT_OPEN_ORDERS: usize = 35;

// PerpPosition, relative to the slot
const PERP_BASE_ASSET_AMOUNT: usize = 8;
const PERP_QUOTE_ASSET_AMOUNT: usize = 16;
const PERP_LP_SHARES: usize = 64;
const PERP_MARKET_INDEX: usize = 92;
const PERP_OPEN_ORDERS: usize = 94;

/// SpotMarket.oracle and PerpMarket.amm.oracle
pub const MARKET_ORACLE_OFFSET: usize = 40;

/// Markets a Drift user touches, which Drift's margin check expects as remaining accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserMarkets {
    pub spot: BTreeSet<u16>,
    pub perp: BTreeSet<u16>,
}

impl UserMarkets {
    pub fn decode(address: &Pubkey, data: &[u8]) -> Result<Self, WithdrawError> {
        if !has_discriminator(data, "User") || data.len() < USER_MIN_LEN {
            return Err(external_unavailable(address, "not a drift user"));
        }
        let truncated = || external_unavailable(address, "truncated");
        let mut markets = UserMarkets::default();

        for i in 0..USER_POSITION_SLOTS {
            let slot = USER_SPOT_POSITIONS_OFFSET + i * SPOT_POSITION_SIZE;
            let scaled_balance = read_u64(data, slot + SPOT_SCALED_BALANCE).ok_or_else(truncated)?;
            let open_orders = read_u8(data, slot + SPOT_OPEN_ORDERS).ok_or_else(truncated)?;
            if scaled_balance == 0 && open_orders == 0 {
                continue;
            }
            markets
                .spot
                .insert(read_u16(data, slot + SPOT_MARKET_INDEX).ok_or_else(truncated)?);
            let open_bids = read_i64(data, slot + SPOT_OPEN_BIDS).ok_or_else(truncated)?;
            let open_asks = read_i64(data, slot + SPOT_OPEN_ASKS).ok_or_else(truncated)?;
            if open_bids != 0 || open_asks != 0 {
                markets.spot.insert(DRIFT_QUOTE_SPOT_MARKET_INDEX);
            }
        }

        for i in 0..USER_POSITION_SLOTS {
            let slot = USER_PERP_POSITIONS_OFFSET + i * PERP_POSITION_SIZE;
            let base = read_i64(data, slot + PERP_BASE_ASSET_AMOUNT).ok_or_else(truncated)?;
            let quote = read_i64(data, slot + PERP_QUOTE_ASSET_AMOUNT).ok_or_else(truncated)?;
            let lp_shares = read_u64(data, slot + PERP_LP_SHARES).ok_or_else(truncated)?;
            let open_orders = read_u8(data, slot + PERP_OPEN_ORDERS).ok_or_else(truncated)?;
            if base == 0 && quote == 0 && lp_shares == 0 && open_orders == 0 {
                continue;
            }
            markets
                .perp
                .insert(read_u16(data, slot + PERP_MARKET_INDEX).ok_or_else(truncated)?);
            // perps settle in the quote spot market
            markets.spot.insert(DRIFT_QUOTE_SPOT_MARKET_INDEX);
        }

        Ok(markets)
    }
}

pub fn drift_pda(seeds: &[&[u8]]) -> Pubkey {
    Pubkey::find_program_address(seeds, &DRIFT_PROGRAM_ID).0
}

pub fn spot_market_address(market_index: u16) -> Pubkey {
    drift_pda(&[DRIFT_SPOT_MARKET_SEED, &market_index.to_le_bytes()])
}

pub fn perp_market_address(market_index: u16) -> Pubkey {
    drift_pda(&[DRIFT_PERP_MARKET_SEED, &market_index.to_le_bytes()])
}

pub fn user_address(authority: &Pubkey, sub_account_id: u16) -> Pubkey {
    drift_pda(&[DRIFT_USER_SEED, authority.as_ref(), &sub_account_id.to_le_bytes()])
}

/// Drift spot deposit held by the strategy authority's Drift user.
pub struct DriftResolver {
    pub market_index: u16,
    pub sub_account_id: u16,
}

#[async_trait]
impl ProtocolAccountResolver for DriftResolver {
    async fn resolve_accounts(
        &self,
        reader: &dyn ChainReader,
        ctx: &ResolveContext,
    ) -> Result<RemainingAccountSet, WithdrawError> {
        let drift_signer = drift_pda(&[DRIFT_SIGNER_SEED]);
        let user_stats = drift_pda(&[DRIFT_USER_STATS_SEED, ctx.strategy_authority.as_ref()]);
        let user = user_address(&ctx.strategy_authority, self.sub_account_id);

        let user_account = reader
            .get_account(&user)
            .await
            .map_err(|e| read_failed(&user, e))?
            .ok_or_else(|| external_unavailable(&user, "drift user not found"))?;
        let mut markets = UserMarkets::decode(&user, &user_account.data)?;
        markets.spot.insert(self.market_index);

        let spot_markets: Vec<(u16, Pubkey)> = markets
            .spot
            .iter()
            .map(|index| (*index, spot_market_address(*index)))
            .collect();
        let perp_markets: Vec<Pubkey> = markets.perp.iter().map(|i| perp_market_address(*i)).collect();

        let market_keys: Vec<Pubkey> = spot_markets
            .iter()
            .map(|(_, key)| *key)
            .chain(perp_markets.iter().copied())
            .collect();
        let market_accounts = reader
            .get_multiple_accounts(&market_keys)
            .await
            .map_err(|e| read_failed(market_keys.first().unwrap_or(&user), e))?;

        let mut oracles: Vec<Pubkey> = Vec::new();
        for (key, account) in market_keys.iter().zip(market_accounts.iter()) {
            let data = &account
                .as_ref()
                .ok_or_else(|| external_unavailable(key, "drift market not found"))?
                .data;
            let oracle = read_pubkey(data, MARKET_ORACLE_OFFSET)
                .ok_or_else(|| external_unavailable(key, "truncated market"))?;
            if oracle != Pubkey::default() && !oracles.contains(&oracle) {
                oracles.push(oracle);
            }
        }

        let mut accounts = vec![
            AccountMeta::new(drift_signer, false),
            AccountMeta::new(ctx.strategy, false),
            AccountMeta::new_readonly(DRIFT_PROGRAM_ID, false),
            AccountMeta::new(user_stats, false),
            AccountMeta::new(user, false),
            AccountMeta::new_readonly(DRIFT_STATE, false),
        ];
        accounts.extend(oracles.iter().map(|o| AccountMeta::new_readonly(*o, false)));
        accounts.extend(spot_markets.iter().map(|(index, key)| {
            if *index == self.market_index {
                AccountMeta::new(*key, false)
            } else {
                AccountMeta::new_readonly(*key, false)
            }
        }));
        accounts.extend(perp_markets.iter().map(|m| AccountMeta::new_readonly(*m, false)));

        debug!(
            "Drift user {}: spot markets {:?}, perp markets {:?}, {} oracles",
            user,
            markets.spot,
            markets.perp,
            oracles.len()
        );

        Ok(RemainingAccountSet {
            accounts,
            lookup_tables: vec![DRIFT_LOOKUP_TABLE],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{account_discriminator, DISCRIMINATOR_SIZE};

    fn user_data(name: &str) -> Vec<u8> {
        let mut data = vec![0u8; USER_MIN_LEN];
        data[..DISCRIMINATOR_SIZE].copy_from_slice(&account_discriminator(name));
        data
    }

    fn put(data: &mut [u8], offset: usize, bytes: &[u8]) {
        data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    #[test]
    fn test_empty_user_touches_no_markets() {
        let data = user_data("User");
        let markets = UserMarkets::decode(&Pubkey::new_unique(), &data).unwrap();
        assert!(markets.spot.is_empty());
        assert!(markets.perp.is_empty());
    }

    #[test]
    fn test_perp_position_pulls_in_quote_market() {
        let mut data = user_data("User");
        let slot = USER_PERP_POSITIONS_OFFSET + 2 * PERP_POSITION_SIZE;
        put(&mut data, slot + PERP_BASE_ASSET_AMOUNT, &(-5i64).to_le_bytes());
        put(&mut data, slot + PERP_MARKET_INDEX, &7u16.to_le_bytes());
        let slot = USER_SPOT_POSITIONS_OFFSET + SPOT_POSITION_SIZE;
        put(&mut data, slot + SPOT_SCALED_BALANCE, &1_000u64.to_le_bytes());
        put(&mut data, slot + SPOT_MARKET_INDEX, &34u16.to_le_bytes());

        let markets = UserMarkets::decode(&Pubkey::new_unique(), &data).unwrap();
        assert_eq!(markets.spot.iter().copied().collect::<Vec<_>>(), vec![0, 34]);
        assert_eq!(markets.perp.iter().copied().collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    fn test_wrong_account_type_rejected() {
        let data = user_data("UserStats");
        assert!(UserMarkets::decode(&Pubkey::new_unique(), &data).is_err());
    }
}
