// =============================================================================
// Account fixtures for MemoryChainReader-backed tests
// =============================================================================

#![allow(dead_code)]

use async_trait::async_trait;
use common::pda;
use solana_client::client_error::ClientError;
use solana_sdk::{account::Account, program_option::COption, program_pack::Pack, pubkey::Pubkey};
use spl_token::state::{Account as TokenAccount, AccountState, Mint};
use std::io;
use vault_withdraw_tools::{
    chain::ChainReader,
    config::{EngineConfig, StrategyEntry, VaultEntry},
    constants::{DRIFT_PROGRAM_ID, KAMINO_LEND_PROGRAM_ID, KAMINO_VAULTS_PROGRAM_ID},
    layout::*,
    resolver::{drift::*, kamino::*, ResolveContext},
    MemoryChainReader, ProtocolKind, Strategy, WithdrawError,
};

pub const PROGRAM_ID: Pubkey = pda::VOLTR_VAULT_PROGRAM_ID;

pub const RESERVE_LEN: usize = 8624;
pub const DRIFT_MARKET_LEN: usize = 776;

// =============================================================================
// Raw account data
// =============================================================================

/// Zero-filled buffer of `len` bytes carrying the Anchor discriminator for `name`.
pub fn blank_account_data(name: &str, len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len.max(DISCRIMINATOR_SIZE)];
    data[..DISCRIMINATOR_SIZE].copy_from_slice(&account_discriminator(name));
    data
}

pub fn write_pubkey(data: &mut [u8], offset: usize, value: &Pubkey) {
    data[offset..offset + 32].copy_from_slice(value.as_ref());
}

pub fn write_u64(data: &mut [u8], offset: usize, value: u64) {
    data[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}

pub fn write_i64(data: &mut [u8], offset: usize, value: i64) {
    data[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}

pub fn write_u16(data: &mut [u8], offset: usize, value: u16) {
    data[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

// =============================================================================
// Readers
// =============================================================================

/// Reader whose every request times out at the transport.
pub struct TimedOutChainReader;

fn timed_out() -> WithdrawError {
    WithdrawError::Rpc(ClientError::from(io::Error::new(
        io::ErrorKind::TimedOut,
        "rpc request timed out",
    )))
}

#[async_trait]
impl ChainReader for TimedOutChainReader {
    async fn get_account(&self, _address: &Pubkey) -> Result<Option<Account>, WithdrawError> {
        Err(timed_out())
    }

    async fn get_multiple_accounts(
        &self,
        _addresses: &[Pubkey],
    ) -> Result<Vec<Option<Account>>, WithdrawError> {
        Err(timed_out())
    }
}

pub fn insert_mint(reader: &mut MemoryChainReader, address: Pubkey, supply: u64, decimals: u8) {
    let mut data = vec![0u8; Mint::LEN];
    Mint::pack(
        Mint {
            mint_authority: COption::None,
            supply,
            decimals,
            is_initialized: true,
            freeze_authority: COption::None,
        },
        &mut data,
    )
    .unwrap();
    reader.insert_data(address, spl_token::id(), data);
}

pub fn insert_token_account(
    reader: &mut MemoryChainReader,
    address: Pubkey,
    mint: Pubkey,
    owner: Pubkey,
    amount: u64,
) {
    let mut data = vec![0u8; TokenAccount::LEN];
    TokenAccount::pack(
        TokenAccount {
            mint,
            owner,
            amount,
            delegate: COption::None,
            state: AccountState::Initialized,
            is_native: COption::None,
            delegated_amount: 0,
            close_authority: COption::None,
        },
        &mut data,
    )
    .unwrap();
    reader.insert_data(address, spl_token::id(), data);
}

pub struct VaultFixture {
    pub vault: Pubkey,
    pub asset_mint: Pubkey,
    pub lookup_table: Pubkey,
    pub strategies: Vec<Strategy>,
}

impl VaultFixture {
    pub fn new(protocols: &[ProtocolKind]) -> Self {
        let vault = Pubkey::new_unique();
        let strategies = protocols
            .iter()
            .map(|protocol| Strategy {
                address: Pubkey::new_unique(),
                vault,
                protocol: *protocol,
                adaptor_program: Pubkey::new_unique(),
            })
            .collect();
        Self {
            vault,
            asset_mint: Pubkey::new_unique(),
            lookup_table: Pubkey::new_unique(),
            strategies,
        }
    }

    pub fn config(&self) -> EngineConfig {
        EngineConfig {
            vaults: vec![VaultEntry {
                address: self.vault,
                lookup_table: self.lookup_table,
                strategies: self
                    .strategies
                    .iter()
                    .map(|s| {
                        let (market_index, sub_account_id) = match s.protocol {
                            ProtocolKind::Drift {
                                market_index,
                                sub_account_id,
                            } => (Some(market_index), Some(sub_account_id)),
                            _ => (None, None),
                        };
                        StrategyEntry {
                            address: s.address,
                            adaptor_program: s.adaptor_program,
                            protocol: s.protocol.name().to_string(),
                            market_index,
                            sub_account_id,
                        }
                    })
                    .collect(),
            }],
        }
    }

    /// Vault account, LP mint and a 6-decimal asset mint.
    pub fn insert_vault(
        &self,
        reader: &mut MemoryChainReader,
        total_asset_value: u64,
        lp_supply: u64,
        unminted_fees: u64,
    ) {
        let mut data = blank_account_data("Vault", VAULT_MIN_LEN);
        write_pubkey(&mut data, VAULT_ASSET_MINT_OFFSET, &self.asset_mint);
        write_u64(&mut data, VAULT_ASSET_TOTAL_VALUE_OFFSET, total_asset_value);
        write_u64(&mut data, VAULT_ACCUMULATED_LP_MANAGER_FEES_OFFSET, unminted_fees);
        reader.insert_data(self.vault, PROGRAM_ID, data);

        insert_mint(reader, pda::get_vault_lp_mint(&self.vault, &PROGRAM_ID), lp_supply, 9);
        insert_mint(reader, self.asset_mint, 0, 6);
    }

    pub fn strategy(&self, address: &Pubkey) -> &Strategy {
        self.strategies
            .iter()
            .find(|s| s.address == *address)
            .expect("strategy belongs to the fixture")
    }

    pub fn insert_position(&self, reader: &mut MemoryChainReader, strategy: &Pubkey, value: u64) {
        let adaptor = self.strategy(strategy).adaptor_program;
        self.insert_receipt(reader, strategy, strategy, &adaptor, value);
    }

    /// Receipt stored at `strategy`'s PDA but recording `recorded_strategy` and `adaptor`.
    pub fn insert_receipt(
        &self,
        reader: &mut MemoryChainReader,
        strategy: &Pubkey,
        recorded_strategy: &Pubkey,
        adaptor: &Pubkey,
        value: u64,
    ) {
        let mut data = blank_account_data("StrategyInitReceipt", RECEIPT_MIN_LEN);
        write_pubkey(&mut data, RECEIPT_VAULT_OFFSET, &self.vault);
        write_pubkey(&mut data, RECEIPT_STRATEGY_OFFSET, recorded_strategy);
        write_pubkey(&mut data, RECEIPT_ADAPTOR_OFFSET, adaptor);
        write_u64(&mut data, RECEIPT_POSITION_VALUE_OFFSET, value);
        write_i64(&mut data, RECEIPT_LAST_UPDATED_TS_OFFSET, 1_700_000_000);
        reader.insert_data(
            pda::get_strategy_init_receipt(&self.vault, strategy, &PROGRAM_ID),
            PROGRAM_ID,
            data,
        );
    }

    pub fn context(&self, strategy: &Pubkey) -> ResolveContext {
        ResolveContext {
            vault: self.vault,
            strategy: *strategy,
            strategy_authority: pda::get_vault_strategy_auth(&self.vault, strategy, &PROGRAM_ID),
            asset_mint: self.asset_mint,
            asset_token_program: spl_token::id(),
        }
    }
}

/// Kamino vault allocating to `allocations` as (reserve, deployed ctokens).
pub fn insert_kvault(
    reader: &mut MemoryChainReader,
    kvault: Pubkey,
    allocations: &[(Pubkey, u64)],
    lookup_table: Pubkey,
) {
    let mut data = blank_account_data("VaultState", KVAULT_STATE_LEN);
    for (i, (reserve, ctokens)) in allocations.iter().enumerate() {
        let entry = KVAULT_ALLOCATIONS_OFFSET + i * KVAULT_ALLOCATION_SIZE;
        write_pubkey(&mut data, entry, reserve);
        write_u64(&mut data, entry + ALLOCATION_CTOKEN_ALLOCATION_OFFSET, *ctokens);
    }
    write_pubkey(&mut data, KVAULT_LOOKUP_TABLE_OFFSET, &lookup_table);
    reader.insert_data(kvault, KAMINO_VAULTS_PROGRAM_ID, data);
}

pub fn insert_reserve(reader: &mut MemoryChainReader, reserve: Pubkey, lending_market: Pubkey) {
    let mut data = blank_account_data("Reserve", RESERVE_LEN);
    write_pubkey(&mut data, RESERVE_LENDING_MARKET_OFFSET, &lending_market);
    reader.insert_data(reserve, KAMINO_LEND_PROGRAM_ID, data);
}

/// Drift user with spot balances in `spot_markets` and base positions in `perp_markets`.
pub fn insert_drift_user(
    reader: &mut MemoryChainReader,
    user: Pubkey,
    spot_markets: &[u16],
    perp_markets: &[u16],
) {
    let mut data = blank_account_data("User", USER_MIN_LEN);
    for (i, market) in spot_markets.iter().enumerate() {
        let slot = USER_SPOT_POSITIONS_OFFSET + i * SPOT_POSITION_SIZE;
        write_u64(&mut data, slot, 1_000_000);
        write_u16(&mut data, slot + 32, *market);
    }
    for (i, market) in perp_markets.iter().enumerate() {
        let slot = USER_PERP_POSITIONS_OFFSET + i * PERP_POSITION_SIZE;
        write_i64(&mut data, slot + 8, 10);
        write_u16(&mut data, slot + 92, *market);
    }
    reader.insert_data(user, DRIFT_PROGRAM_ID, data);
}

pub fn insert_drift_market(reader: &mut MemoryChainReader, market: Pubkey, oracle: Pubkey) {
    let mut data = vec![0u8; DRIFT_MARKET_LEN];
    write_pubkey(&mut data, 8, &market);
    write_pubkey(&mut data, MARKET_ORACLE_OFFSET, &oracle);
    reader.insert_data(market, DRIFT_PROGRAM_ID, data);
}
