//! Protocol-specific account resolution for `direct_withdraw_strategy`.
//!
//! Each resolver produces the remaining-account tail the strategy's adaptor
//! program forwards to its external protocol. The tail is positional: the
//! external program decodes accounts by index.

pub mod drift;
pub mod jupiter;
pub mod kamino;

pub use drift::DriftResolver;
pub use jupiter::JupiterResolver;
pub use kamino::KaminoResolver;

use crate::{
    chain::ChainReader,
    error::WithdrawError,
    state::{ProtocolKind, RemainingAccountSet, Strategy, Vault},
};
use async_trait::async_trait;
use common::pda;
use solana_sdk::pubkey::Pubkey;

/// Identity of one (vault, strategy) pair as seen by a resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveContext {
    pub vault: Pubkey,
    pub strategy: Pubkey,
    /// Vault-program PDA that owns the strategy's protocol positions
    pub strategy_authority: Pubkey,
    pub asset_mint: Pubkey,
    pub asset_token_program: Pubkey,
}

impl ResolveContext {
    pub fn new(vault: &Vault, strategy: &Pubkey, program_id: &Pubkey) -> Self {
        Self {
            vault: vault.address,
            strategy: *strategy,
            strategy_authority: pda::get_vault_strategy_auth(&vault.address, strategy, program_id),
            asset_mint: vault.asset_mint,
            asset_token_program: vault.asset_token_program,
        }
    }
}

#[async_trait]
pub trait ProtocolAccountResolver: Send + Sync {
    /// Derives the ordered remaining accounts and lookup tables for a
    /// withdrawal from `ctx.strategy`. External state is read on every call.
    async fn resolve_accounts(
        &self,
        reader: &dyn ChainReader,
        ctx: &ResolveContext,
    ) -> Result<RemainingAccountSet, WithdrawError>;
}

impl ProtocolKind {
    pub fn resolver(&self) -> Box<dyn ProtocolAccountResolver> {
        match *self {
            ProtocolKind::Kamino => Box::new(KaminoResolver),
            ProtocolKind::Drift {
                market_index,
                sub_account_id,
            } => Box::new(DriftResolver {
                market_index,
                sub_account_id,
            }),
            ProtocolKind::Jupiter => Box::new(JupiterResolver),
        }
    }
}

/// Resolves `strategy` with the resolver of its protocol.
pub async fn resolve_accounts(
    reader: &dyn ChainReader,
    strategy: &Strategy,
    ctx: &ResolveContext,
) -> Result<RemainingAccountSet, WithdrawError> {
    strategy.protocol.resolver().resolve_accounts(reader, ctx).await
}

fn external_unavailable(account: &Pubkey, reason: impl Into<String>) -> WithdrawError {
    WithdrawError::ExternalStateUnavailable {
        account: *account,
        reason: reason.into(),
    }
}

/// A reader failure on `account`, or on the batch that starts with it.
fn read_failed(account: &Pubkey, err: WithdrawError) -> WithdrawError {
    external_unavailable(account, format!("read failed: {}", err))
}
