use crate::{
    chain::ChainReader,
    config::{EngineConfig, VaultEntry},
    error::WithdrawError,
    layout::*,
    state::{PositionRecord, Strategy, Vault, VaultFees},
};
use common::pda;
use log::{debug, info};
use solana_sdk::{account::Account, program_pack::Pack, pubkey::Pubkey};
use spl_token::state::{Account as TokenAccount, Mint};

/// Read-only view of configured strategies and their live position values.
pub struct StrategyRegistry {
    config: EngineConfig,
    program_id: Pubkey,
}

impl StrategyRegistry {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_program_id(config, pda::VOLTR_VAULT_PROGRAM_ID)
    }

    pub fn with_program_id(config: EngineConfig, program_id: Pubkey) -> Self {
        Self { config, program_id }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    pub fn supports(&self, vault: &Pubkey) -> bool {
        self.config.vault(vault).is_some()
    }

    pub fn vault_entry(&self, vault: &Pubkey) -> Result<&VaultEntry, WithdrawError> {
        self.config
            .vault(vault)
            .ok_or(WithdrawError::DirectWithdrawUnsupported(*vault))
    }

    /// Strategies configured for `vault`, ordered by address.
    pub fn list_strategies(&self, vault: &Pubkey) -> Result<Vec<Strategy>, WithdrawError> {
        let mut strategies = self.vault_entry(vault)?.strategies()?;
        strategies.sort_by(|a, b| a.address.cmp(&b.address));
        Ok(strategies)
    }

    /// Reads the position value the vault program last recorded for `strategy`.
    ///
    /// # Errors
    /// * `PositionUnavailable` if the receipt cannot be read, is missing, does not
    ///   decode, or belongs to a different vault, strategy or adaptor
    pub async fn fetch_position_value(
        &self,
        reader: &dyn ChainReader,
        vault: &Pubkey,
        strategy: &Strategy,
    ) -> Result<PositionRecord, WithdrawError> {
        let receipt = pda::get_strategy_init_receipt(vault, &strategy.address, &self.program_id);
        let account = reader
            .get_account(&receipt)
            .await
            .map_err(|e| read_failed(&strategy.address, e))?;
        decode_position_record(vault, strategy, account.as_ref())
    }

    /// Position values for every strategy in one batched read, in input order.
    ///
    /// A failed batch read is reported against the first strategy in `strategies`.
    pub async fn fetch_position_values(
        &self,
        reader: &dyn ChainReader,
        vault: &Pubkey,
        strategies: &[Strategy],
    ) -> Result<Vec<PositionRecord>, WithdrawError> {
        let Some(first) = strategies.first() else {
            return Ok(Vec::new());
        };
        let receipts: Vec<Pubkey> = strategies
            .iter()
            .map(|s| pda::get_strategy_init_receipt(vault, &s.address, &self.program_id))
            .collect();
        let accounts = reader
            .get_multiple_accounts(&receipts)
            .await
            .map_err(|e| read_failed(&first.address, e))?;

        let positions = strategies
            .iter()
            .zip(accounts.iter())
            .map(|(strategy, account)| decode_position_record(vault, strategy, account.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let total: u128 = positions.iter().map(|p| p.position_value as u128).sum();
        info!(
            "Fetched {} position values for vault {}, total {}",
            positions.len(),
            vault,
            total
        );
        Ok(positions)
    }

    /// Reads the vault account, its LP mint and its asset mint.
    pub async fn fetch_vault(
        &self,
        reader: &dyn ChainReader,
        vault: &Pubkey,
    ) -> Result<Vault, WithdrawError> {
        let lp_mint = pda::get_vault_lp_mint(vault, &self.program_id);
        let accounts = reader
            .get_multiple_accounts(&[*vault, lp_mint])
            .await
            .map_err(|e| unavailable(vault, &e.to_string()))?;
        let vault_account = required(vault, accounts.first().and_then(Option::as_ref))?;
        let lp_mint_account = required(&lp_mint, accounts.get(1).and_then(Option::as_ref))?;

        let data = &vault_account.data;
        if !has_discriminator(data, "Vault") || data.len() < VAULT_MIN_LEN {
            return Err(unavailable(vault, "not a vault account"));
        }
        let field = |value: Option<u64>| value.ok_or_else(|| unavailable(vault, "truncated"));
        let asset_mint = read_pubkey(data, VAULT_ASSET_MINT_OFFSET)
            .ok_or_else(|| unavailable(vault, "truncated"))?;
        let total_asset_value = field(read_u64(data, VAULT_ASSET_TOTAL_VALUE_OFFSET))?;
        let fees = VaultFees {
            accumulated_lp_manager_fees: field(read_u64(
                data,
                VAULT_ACCUMULATED_LP_MANAGER_FEES_OFFSET,
            ))?,
            accumulated_lp_admin_fees: field(read_u64(data, VAULT_ACCUMULATED_LP_ADMIN_FEES_OFFSET))?,
            accumulated_lp_protocol_fees: field(read_u64(
                data,
                VAULT_ACCUMULATED_LP_PROTOCOL_FEES_OFFSET,
            ))?,
        };

        let lp = unpack_mint(&lp_mint, lp_mint_account)?;
        let asset_mint_account = reader
            .get_account(&asset_mint)
            .await
            .map_err(|e| unavailable(&asset_mint, &e.to_string()))?;
        let asset_mint_account = required(&asset_mint, asset_mint_account.as_ref())?;
        let asset = unpack_mint(&asset_mint, asset_mint_account)?;

        debug!(
            "Vault {}: total value {}, lp supply {}, unminted fees {:?}",
            vault, total_asset_value, lp.supply, fees
        );

        Ok(Vault {
            address: *vault,
            asset_mint,
            asset_decimals: asset.decimals,
            asset_token_program: asset_mint_account.owner,
            total_asset_value,
            share_supply: lp.supply,
            share_decimals: lp.decimals,
            fees,
        })
    }

    /// LP balance of `user`'s associated LP token account, `None` if it does not exist.
    pub async fn fetch_share_balance(
        &self,
        reader: &dyn ChainReader,
        vault: &Pubkey,
        user: &Pubkey,
    ) -> Result<Option<u64>, WithdrawError> {
        let ata = self.user_lp_ata(vault, user);
        let account = reader
            .get_account(&ata)
            .await
            .map_err(|e| unavailable(&ata, &e.to_string()))?;
        let Some(account) = account else {
            return Ok(None);
        };
        let data = account
            .data
            .get(..TokenAccount::LEN)
            .ok_or_else(|| unavailable(&ata, "not a token account"))?;
        let token_account =
            TokenAccount::unpack(data).map_err(|e| unavailable(&ata, &e.to_string()))?;
        Ok(Some(token_account.amount))
    }

    pub fn user_lp_ata(&self, vault: &Pubkey, user: &Pubkey) -> Pubkey {
        let lp_mint = pda::get_vault_lp_mint(vault, &self.program_id);
        spl_associated_token_account::get_associated_token_address_with_program_id(
            user,
            &lp_mint,
            &spl_token::id(),
        )
    }
}

fn decode_position_record(
    vault: &Pubkey,
    strategy: &Strategy,
    account: Option<&Account>,
) -> Result<PositionRecord, WithdrawError> {
    let position_unavailable = |reason: &str| WithdrawError::PositionUnavailable {
        strategy: strategy.address,
        reason: reason.to_string(),
    };

    let data = &account
        .ok_or_else(|| position_unavailable("strategy init receipt not found"))?
        .data;
    if !has_discriminator(data, "StrategyInitReceipt") || data.len() < RECEIPT_MIN_LEN {
        return Err(position_unavailable("not a strategy init receipt"));
    }
    if read_pubkey(data, RECEIPT_VAULT_OFFSET) != Some(*vault)
        || read_pubkey(data, RECEIPT_STRATEGY_OFFSET) != Some(strategy.address)
    {
        return Err(position_unavailable("receipt belongs to another vault or strategy"));
    }
    if read_pubkey(data, RECEIPT_ADAPTOR_OFFSET) != Some(strategy.adaptor_program) {
        return Err(position_unavailable("receipt adaptor differs from configured adaptor"));
    }

    Ok(PositionRecord {
        strategy: strategy.address,
        position_value: read_u64(data, RECEIPT_POSITION_VALUE_OFFSET)
            .ok_or_else(|| position_unavailable("truncated"))?,
        last_updated_ts: read_i64(data, RECEIPT_LAST_UPDATED_TS_OFFSET)
            .ok_or_else(|| position_unavailable("truncated"))?,
    })
}

fn unpack_mint(address: &Pubkey, account: &Account) -> Result<Mint, WithdrawError> {
    let data = account
        .data
        .get(..Mint::LEN)
        .ok_or_else(|| unavailable(address, "not a mint"))?;
    Mint::unpack(data).map_err(|e| unavailable(address, &e.to_string()))
}

fn required<'a>(address: &Pubkey, account: Option<&'a Account>) -> Result<&'a Account, WithdrawError> {
    account.ok_or_else(|| unavailable(address, "account not found"))
}

fn read_failed(strategy: &Pubkey, err: WithdrawError) -> WithdrawError {
    WithdrawError::PositionUnavailable {
        strategy: *strategy,
        reason: format!("receipt read failed: {}", err),
    }
}

fn unavailable(account: &Pubkey, reason: &str) -> WithdrawError {
    WithdrawError::ExternalStateUnavailable {
        account: *account,
        reason: reason.to_string(),
    }
}
