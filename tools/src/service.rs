use crate::{
    allocator::WithdrawalAllocator,
    builder::{InstructionSequenceBuilder, WithdrawalInstructions},
    chain::ChainReader,
    config::EngineConfig,
    error::WithdrawError,
    registry::StrategyRegistry,
    state::{AllocationPlan, Vault, WithdrawalRequest},
};
use common::share_math::assets_for_withdraw;
use log::{info, warn};
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;

/// A planned direct withdrawal, ready for signing.
#[derive(Debug, Clone)]
pub struct DirectWithdrawal {
    pub vault: Vault,
    /// Asset amount actually allocated
    pub amount: u64,
    pub plan: AllocationPlan,
    pub instructions: WithdrawalInstructions,
}

/// Entry point for building direct withdrawals from configured vaults.
pub struct DirectWithdrawalService {
    reader: Arc<dyn ChainReader>,
    registry: StrategyRegistry,
}

impl DirectWithdrawalService {
    pub fn new(reader: Arc<dyn ChainReader>, config: EngineConfig) -> Self {
        Self::with_registry(reader, StrategyRegistry::new(config))
    }

    pub fn with_registry(reader: Arc<dyn ChainReader>, registry: StrategyRegistry) -> Self {
        Self { reader, registry }
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    pub fn supports_direct_withdrawal(&self, vault: &Pubkey) -> bool {
        self.registry.supports(vault)
    }

    /// Plans `request` across the vault's strategies and builds its instructions.
    ///
    /// With `is_withdraw_all` set, `request.amount` is ignored and the amount is
    /// the asset value of the user's whole LP balance.
    pub async fn create_direct_withdrawal(
        &self,
        request: &WithdrawalRequest,
    ) -> Result<DirectWithdrawal, WithdrawError> {
        let reader = self.reader.as_ref();
        let entry = self.registry.vault_entry(&request.vault)?;
        let vault = self.registry.fetch_vault(reader, &request.vault).await?;

        let amount = if request.is_withdraw_all {
            let shares = self
                .registry
                .fetch_share_balance(reader, &request.vault, &request.user)
                .await?
                .unwrap_or(0);
            let amount = assets_for_withdraw(
                shares,
                vault.total_asset_value,
                vault.effective_share_supply()?,
            )?;
            info!(
                "Withdraw all for {}: {} shares redeem {} assets",
                request.user, shares, amount
            );
            amount
        } else {
            request.amount
        };
        let request = WithdrawalRequest { amount, ..*request };

        let plan = WithdrawalAllocator::new(&self.registry)
            .plan(reader, &request)
            .await?;
        let strategies = self.registry.list_strategies(&request.vault)?;
        let instructions = InstructionSequenceBuilder::new(
            *self.registry.program_id(),
            Some(entry.lookup_table),
        )
        .build(reader, &vault, &strategies, &request.user, &plan)
        .await?;

        Ok(DirectWithdrawal {
            vault,
            amount,
            plan,
            instructions,
        })
    }

    /// Whether `user` holds an LP token account for a direct-withdraw vault.
    /// Read failures count as `false`.
    pub async fn can_direct_withdraw(&self, vault: &Pubkey, user: &Pubkey) -> bool {
        if !self.supports_direct_withdrawal(vault) {
            return false;
        }
        match self
            .registry
            .fetch_share_balance(self.reader.as_ref(), vault, user)
            .await
        {
            Ok(balance) => balance.is_some(),
            Err(e) => {
                warn!("Error checking direct withdrawal capability: {}", e);
                false
            }
        }
    }
}
