use crate::error::WithdrawError;
use solana_sdk::{instruction::AccountMeta, pubkey::Pubkey};

/// External lending protocol a strategy deploys into, with its parameters.
///
/// Every variant has an account resolver; see [`crate::resolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolKind {
    /// Kamino lending vault. The strategy address is the kvault.
    Kamino,
    /// Drift spot market deposit held by a Drift user sub-account.
    Drift { market_index: u16, sub_account_id: u16 },
    /// Jupiter Lend earn position. The strategy address is the lending account.
    Jupiter,
}

impl ProtocolKind {
    pub fn name(&self) -> &'static str {
        match self {
            ProtocolKind::Kamino => "kamino",
            ProtocolKind::Drift { .. } => "drift",
            ProtocolKind::Jupiter => "jupiter",
        }
    }
}

/// A vault's position in one external protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strategy {
    pub address: Pubkey,
    pub vault: Pubkey,
    pub protocol: ProtocolKind,
    /// Adaptor program the vault program calls to route the withdrawal.
    pub adaptor_program: Pubkey,
}

/// Accumulated fees the vault owes in share units that are not yet minted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VaultFees {
    pub accumulated_lp_manager_fees: u64,
    pub accumulated_lp_admin_fees: u64,
    pub accumulated_lp_protocol_fees: u64,
}

impl VaultFees {
    pub fn total(&self) -> Option<u64> {
        self.accumulated_lp_manager_fees
            .checked_add(self.accumulated_lp_admin_fees)?
            .checked_add(self.accumulated_lp_protocol_fees)
    }
}

/// Snapshot of a vault's bookkeeping, read fresh for each request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vault {
    pub address: Pubkey,
    pub asset_mint: Pubkey,
    pub asset_decimals: u8,
    pub asset_token_program: Pubkey,
    /// Idle plus deployed asset value attributed to the vault
    pub total_asset_value: u64,
    /// Minted LP supply
    pub share_supply: u64,
    pub share_decimals: u8,
    pub fees: VaultFees,
}

impl Vault {
    /// LP supply plus unminted fee shares. Share conversions use this supply.
    pub fn effective_share_supply(&self) -> Result<u64, WithdrawError> {
        self.fees
            .total()
            .and_then(|fees| self.share_supply.checked_add(fees))
            .ok_or(WithdrawError::ArithmeticOverflow)
    }

    pub fn is_native_asset(&self) -> bool {
        self.asset_mint == spl_token::native_mint::id()
    }
}

/// Live value of a vault's position inside one strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionRecord {
    pub strategy: Pubkey,
    /// In the vault asset's smallest unit
    pub position_value: u64,
    pub last_updated_ts: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawalRequest {
    pub vault: Pubkey,
    pub user: Pubkey,
    /// In the vault asset's smallest unit
    pub amount: u64,
    pub is_withdraw_all: bool,
}

/// One strategy's share of a withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationChunk {
    pub strategy: Pubkey,
    pub amount: u64,
    /// Position value the decision was made against
    pub position_value: u64,
    /// The plan's outstanding amount reaches zero with this chunk
    pub is_final_chunk: bool,
    /// This chunk takes the strategy's entire position
    pub drains_position: bool,
    /// Withdraw-all request and this chunk drains its strategy
    pub is_withdraw_all: bool,
}

/// Ordered chunks whose amounts sum exactly to `requested`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationPlan {
    pub requested: u64,
    pub chunks: Vec<AllocationChunk>,
}

impl AllocationPlan {
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.chunks.iter().map(|chunk| chunk.amount).sum()
    }
}

/// Ordered protocol-specific account tail plus the lookup tables it relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemainingAccountSet {
    pub accounts: Vec<AccountMeta>,
    pub lookup_tables: Vec<Pubkey>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault_with(share_supply: u64, fees: VaultFees) -> Vault {
        Vault {
            address: Pubkey::new_unique(),
            asset_mint: Pubkey::new_unique(),
            asset_decimals: 6,
            asset_token_program: spl_token::id(),
            total_asset_value: 1_000,
            share_supply,
            share_decimals: 9,
            fees,
        }
    }

    #[test]
    fn test_effective_supply_includes_unminted_fees() {
        let vault = vault_with(
            1_000,
            VaultFees {
                accumulated_lp_manager_fees: 5,
                accumulated_lp_admin_fees: 3,
                accumulated_lp_protocol_fees: 2,
            },
        );
        assert_eq!(vault.effective_share_supply().unwrap(), 1_010);
    }

    #[test]
    fn test_effective_supply_overflow() {
        let vault = vault_with(
            u64::MAX,
            VaultFees {
                accumulated_lp_manager_fees: 1,
                ..VaultFees::default()
            },
        );
        assert!(matches!(
            vault.effective_share_supply(),
            Err(WithdrawError::ArithmeticOverflow)
        ));
    }

    #[test]
    fn test_native_asset() {
        let mut vault = vault_with(0, VaultFees::default());
        assert!(!vault.is_native_asset());
        vault.asset_mint = spl_token::native_mint::id();
        assert!(vault.is_native_asset());
    }
}
