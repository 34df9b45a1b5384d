use super::{external_unavailable, read_failed, ProtocolAccountResolver, ResolveContext};
use crate::{
    chain::ChainReader,
    constants::*,
    error::WithdrawError,
    layout::{has_discriminator, read_pubkey, read_u64},
    state::RemainingAccountSet,
};
use async_trait::async_trait;
use log::{debug, info};
use solana_sdk::{instruction::AccountMeta, pubkey::Pubkey, sysvar};

// kvault VaultState
pub const KVAULT_ALLOCATIONS_OFFSET: usize = 312;
pub const KVAULT_ALLOCATION_SIZE: usize = 2160;
pub const KVAULT_MAX_RESERVES: usize = 25;
pub const KVAULT_LOOKUP_TABLE_OFFSET: usize = 58568;
pub const KVAULT_STATE_LEN: usize = KVAULT_LOOKUP_TABLE_OFFSET + 32;

// VaultAllocation, relative to the entry
pub const ALLOCATION_RESERVE_OFFSET: usize = 0;
pub const ALLOCATION_CTOKEN_ALLOCATION_OFFSET: usize = 1104;

// klend Reserve
pub const RESERVE_LENDING_MARKET_OFFSET: usize = 32;

/// A reserve the kvault allocates to, with its deployed collateral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReserveAllocation {
    pub reserve: Pubkey,
    pub ctoken_allocation: u64,
}

/// Decoded parts of a kvault this crate needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvaultState {
    pub allocations: Vec<ReserveAllocation>,
    pub lookup_table: Pubkey,
}

impl KvaultState {
    pub fn decode(address: &Pubkey, data: &[u8]) -> Result<Self, WithdrawError> {
        if !has_discriminator(data, "VaultState") || data.len() < KVAULT_STATE_LEN {
            return Err(external_unavailable(address, "not a kamino vault"));
        }

        let mut allocations = Vec::new();
        for i in 0..KVAULT_MAX_RESERVES {
            let entry = KVAULT_ALLOCATIONS_OFFSET + i * KVAULT_ALLOCATION_SIZE;
            let reserve = read_pubkey(data, entry + ALLOCATION_RESERVE_OFFSET)
                .ok_or_else(|| external_unavailable(address, "truncated allocations"))?;
            if reserve == Pubkey::default() {
                continue;
            }
            let ctoken_allocation = read_u64(data, entry + ALLOCATION_CTOKEN_ALLOCATION_OFFSET)
                .ok_or_else(|| external_unavailable(address, "truncated allocations"))?;
            allocations.push(ReserveAllocation {
                reserve,
                ctoken_allocation,
            });
        }

        let lookup_table = read_pubkey(data, KVAULT_LOOKUP_TABLE_OFFSET)
            .ok_or_else(|| external_unavailable(address, "truncated"))?;

        Ok(Self {
            allocations,
            lookup_table,
        })
    }

    /// Reserve with the largest deployed allocation. Ties keep the earlier entry.
    pub fn max_allocated(&self) -> Option<&ReserveAllocation> {
        self.allocations
            .iter()
            .filter(|a| a.ctoken_allocation > 0)
            .fold(None, |best: Option<&ReserveAllocation>, a| match best {
                Some(b) if b.ctoken_allocation >= a.ctoken_allocation => Some(b),
                _ => Some(a),
            })
    }
}

/// Kamino lending vault (kvault). Selects the reserve to redeem from on every call.
pub struct KaminoResolver;

impl KaminoResolver {
    fn kvault_pda(seeds: &[&[u8]]) -> Pubkey {
        Pubkey::find_program_address(seeds, &KAMINO_VAULTS_PROGRAM_ID).0
    }

    fn klend_pda(seeds: &[&[u8]]) -> Pubkey {
        Pubkey::find_program_address(seeds, &KAMINO_LEND_PROGRAM_ID).0
    }
}

#[async_trait]
impl ProtocolAccountResolver for KaminoResolver {
    async fn resolve_accounts(
        &self,
        reader: &dyn ChainReader,
        ctx: &ResolveContext,
    ) -> Result<RemainingAccountSet, WithdrawError> {
        let kvault = ctx.strategy;
        let account = reader
            .get_account(&kvault)
            .await
            .map_err(|e| read_failed(&kvault, e))?
            .ok_or_else(|| external_unavailable(&kvault, "kamino vault not found"))?;
        let state = KvaultState::decode(&kvault, &account.data)?;

        let reserves: Vec<Pubkey> = state.allocations.iter().map(|a| a.reserve).collect();
        let reserve_accounts = reader
            .get_multiple_accounts(&reserves)
            .await
            .map_err(|e| read_failed(reserves.first().unwrap_or(&kvault), e))?;
        let lending_markets = reserves
            .iter()
            .zip(reserve_accounts.iter())
            .map(|(reserve, account)| {
                let data = &account
                    .as_ref()
                    .ok_or_else(|| external_unavailable(reserve, "reserve not found"))?
                    .data;
                if !has_discriminator(data, "Reserve") {
                    return Err(external_unavailable(reserve, "not a klend reserve"));
                }
                read_pubkey(data, RESERVE_LENDING_MARKET_OFFSET)
                    .ok_or_else(|| external_unavailable(reserve, "truncated"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let selected = state
            .max_allocated()
            .ok_or(WithdrawError::NoEligibleSubMarket { strategy: kvault })?;
        let lending_market = reserves
            .iter()
            .position(|r| *r == selected.reserve)
            .and_then(|i| lending_markets.get(i).copied())
            .ok_or_else(|| external_unavailable(&selected.reserve, "reserve not loaded"))?;
        info!(
            "Kamino vault {}: redeeming from reserve {} ({} ctokens deployed)",
            kvault, selected.reserve, selected.ctoken_allocation
        );

        let shares_mint = Self::kvault_pda(&[KAMINO_SHARES_SEED, kvault.as_ref()]);
        let token_vault = Self::kvault_pda(&[KAMINO_TOKEN_VAULT_SEED, kvault.as_ref()]);
        let base_vault_authority = Self::kvault_pda(&[KAMINO_BASE_AUTHORITY_SEED, kvault.as_ref()]);
        let event_authority = Self::kvault_pda(&[EVENT_AUTHORITY_SEED]);
        let ctoken_vault = Self::kvault_pda(&[
            KAMINO_CTOKEN_VAULT_SEED,
            kvault.as_ref(),
            selected.reserve.as_ref(),
        ]);
        let lending_market_authority =
            Self::klend_pda(&[KAMINO_LENDING_MARKET_AUTHORITY_SEED, lending_market.as_ref()]);
        let reserve_liquidity_supply = Self::klend_pda(&[
            KAMINO_RESERVE_LIQUIDITY_SUPPLY_SEED,
            lending_market.as_ref(),
            ctx.asset_mint.as_ref(),
        ]);
        let reserve_collateral_mint = Self::klend_pda(&[
            KAMINO_RESERVE_COLLATERAL_MINT_SEED,
            lending_market.as_ref(),
            ctx.asset_mint.as_ref(),
        ]);
        let strategy_shares_ata =
            spl_associated_token_account::get_associated_token_address_with_program_id(
                &ctx.strategy_authority,
                &shares_mint,
                &spl_token::id(),
            );

        let mut accounts = vec![
            AccountMeta::new(kvault, false),
            AccountMeta::new(token_vault, false),
            AccountMeta::new_readonly(base_vault_authority, false),
            AccountMeta::new(shares_mint, false),
            AccountMeta::new(strategy_shares_ata, false),
            AccountMeta::new(selected.reserve, false),
            AccountMeta::new(ctoken_vault, false),
            AccountMeta::new_readonly(lending_market, false),
            AccountMeta::new_readonly(lending_market_authority, false),
            AccountMeta::new(reserve_liquidity_supply, false),
            AccountMeta::new(reserve_collateral_mint, false),
            AccountMeta::new_readonly(event_authority, false),
            AccountMeta::new_readonly(KAMINO_LEND_PROGRAM_ID, false),
            AccountMeta::new_readonly(KAMINO_VAULTS_PROGRAM_ID, false),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(sysvar::instructions::id(), false),
        ];
        // Every allocation reserve, then each reserve's lending market, for the kvault's AUM refresh
        accounts.extend(reserves.iter().map(|r| AccountMeta::new(*r, false)));
        accounts.extend(lending_markets.iter().map(|m| AccountMeta::new_readonly(*m, false)));

        let lookup_tables = if state.lookup_table == Pubkey::default() {
            Vec::new()
        } else {
            vec![state.lookup_table]
        };
        debug!(
            "Kamino vault {}: {} remaining accounts",
            kvault,
            accounts.len()
        );

        Ok(RemainingAccountSet {
            accounts,
            lookup_tables,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allocation(reserve: Pubkey, ctoken_allocation: u64) -> ReserveAllocation {
        ReserveAllocation {
            reserve,
            ctoken_allocation,
        }
    }

    #[test]
    fn test_max_allocated_prefers_strictly_greater() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let c = Pubkey::new_unique();
        let state = KvaultState {
            allocations: vec![allocation(a, 10), allocation(b, 30), allocation(c, 30)],
            lookup_table: Pubkey::default(),
        };
        assert_eq!(state.max_allocated().unwrap().reserve, b);
    }

    #[test]
    fn test_max_allocated_ignores_empty_reserves() {
        let state = KvaultState {
            allocations: vec![allocation(Pubkey::new_unique(), 0)],
            lookup_table: Pubkey::default(),
        };
        assert!(state.max_allocated().is_none());
    }

    #[test]
    fn test_decode_rejects_short_account() {
        let kvault = Pubkey::new_unique();
        let mut data = vec![0u8; KVAULT_STATE_LEN - 1];
        data[..8].copy_from_slice(&crate::layout::account_discriminator("VaultState"));
        assert!(matches!(
            KvaultState::decode(&kvault, &data),
            Err(WithdrawError::ExternalStateUnavailable { .. })
        ));
    }
}
