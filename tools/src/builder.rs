//! Composes an allocation plan into the vault program's direct-withdraw sequence.

use crate::{
    chain::ChainReader,
    constants::DIRECT_WITHDRAW_COMPUTE_UNITS,
    error::WithdrawError,
    layout::instruction_discriminator,
    resolver::{resolve_accounts, ResolveContext},
    state::{AllocationChunk, AllocationPlan, RemainingAccountSet, Strategy, Vault},
};
use borsh::BorshSerialize;
use common::pda;
use futures::future::try_join_all;
use log::{debug, info};
use solana_sdk::{
    compute_budget::ComputeBudgetInstruction,
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};
use spl_associated_token_account::{
    get_associated_token_address_with_program_id, instruction::create_associated_token_account_idempotent,
};

#[derive(BorshSerialize)]
struct RequestWithdrawVaultArgs {
    amount: u64,
    is_amount_in_lp: bool,
    is_withdraw_all: bool,
}

#[derive(BorshSerialize)]
struct DirectWithdrawStrategyArgs {
    user_args: Option<Vec<u8>>,
}

/// Unsigned instructions plus the lookup tables to resolve before compiling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WithdrawalInstructions {
    pub instructions: Vec<Instruction>,
    /// Deduplicated, vault lookup table first
    pub lookup_table_addresses: Vec<Pubkey>,
}

impl WithdrawalInstructions {
    /// Compute limit to prepend to a direct-withdraw transaction.
    pub fn compute_budget_instruction() -> Instruction {
        ComputeBudgetInstruction::set_compute_unit_limit(DIRECT_WITHDRAW_COMPUTE_UNITS)
    }
}

pub struct InstructionSequenceBuilder {
    program_id: Pubkey,
    vault_lookup_table: Option<Pubkey>,
}

impl InstructionSequenceBuilder {
    pub fn new(program_id: Pubkey, vault_lookup_table: Option<Pubkey>) -> Self {
        Self {
            program_id,
            vault_lookup_table,
        }
    }

    /// Builds the instruction sequence for `plan`.
    ///
    /// Per chunk: create the user's asset account (idempotent), register the
    /// withdrawal request, then direct-withdraw from the chunk's strategy. A
    /// native-asset vault gets a single unwrap at the end.
    ///
    /// # Arguments
    /// * `reader` - Chain state for the protocol resolvers
    /// * `vault` - Fresh vault snapshot
    /// * `strategies` - Strategies the plan may reference
    /// * `user` - Withdrawing wallet, signer and fee payer
    /// * `plan` - Allocation to execute
    pub async fn build(
        &self,
        reader: &dyn ChainReader,
        vault: &Vault,
        strategies: &[Strategy],
        user: &Pubkey,
        plan: &AllocationPlan,
    ) -> Result<WithdrawalInstructions, WithdrawError> {
        if plan.is_empty() {
            return Ok(WithdrawalInstructions::default());
        }

        // Chunks are independent once the plan is fixed
        let resolved = try_join_all(plan.chunks.iter().map(|chunk| async move {
            let strategy = strategies
                .iter()
                .find(|s| s.address == chunk.strategy)
                .ok_or_else(|| {
                    WithdrawError::InvalidState(format!(
                        "plan references unknown strategy {}",
                        chunk.strategy
                    ))
                })?;
            let ctx = ResolveContext::new(vault, &strategy.address, &self.program_id);
            let accounts = resolve_accounts(reader, strategy, &ctx).await?;
            Ok::<_, WithdrawError>((strategy, accounts))
        }))
        .await?;

        let user_asset_ata =
            get_associated_token_address_with_program_id(user, &vault.asset_mint, &vault.asset_token_program);

        let mut instructions = Vec::with_capacity(plan.chunks.len() * 3 + 1);
        let mut lookup_table_addresses: Vec<Pubkey> = self.vault_lookup_table.into_iter().collect();

        for (chunk, (strategy, remaining)) in plan.chunks.iter().zip(resolved.iter()) {
            instructions.push(create_associated_token_account_idempotent(
                user,
                user,
                &vault.asset_mint,
                &vault.asset_token_program,
            ));
            instructions.push(self.request_withdraw_vault(vault, user, chunk)?);
            instructions.push(self.direct_withdraw_strategy(
                vault,
                strategy,
                user,
                &user_asset_ata,
                remaining,
            )?);

            for table in &remaining.lookup_tables {
                if !lookup_table_addresses.contains(table) {
                    lookup_table_addresses.push(*table);
                }
            }
            debug!(
                "Chunk {} from {}: {} remaining accounts",
                chunk.amount,
                strategy.address,
                remaining.accounts.len()
            );
        }

        if vault.is_native_asset() {
            instructions.push(
                spl_token::instruction::close_account(
                    &vault.asset_token_program,
                    &user_asset_ata,
                    user,
                    user,
                    &[],
                )
                .map_err(|e| WithdrawError::InvalidState(e.to_string()))?,
            );
        }

        info!(
            "Built {} instructions for {} chunks with {} lookup tables",
            instructions.len(),
            plan.chunks.len(),
            lookup_table_addresses.len()
        );

        Ok(WithdrawalInstructions {
            instructions,
            lookup_table_addresses,
        })
    }

    fn request_withdraw_vault(
        &self,
        vault: &Vault,
        user: &Pubkey,
        chunk: &AllocationChunk,
    ) -> Result<Instruction, WithdrawError> {
        let protocol = pda::get_protocol(&self.program_id);
        let lp_mint = pda::get_vault_lp_mint(&vault.address, &self.program_id);
        let receipt = pda::get_request_withdraw_vault_receipt(&vault.address, user, &self.program_id);
        let user_lp_ata = get_associated_token_address_with_program_id(user, &lp_mint, &spl_token::id());
        let receipt_lp_ata =
            get_associated_token_address_with_program_id(&receipt, &lp_mint, &spl_token::id());

        let accounts = vec![
            AccountMeta::new(*user, true),
            AccountMeta::new_readonly(*user, true),
            AccountMeta::new_readonly(protocol, false),
            AccountMeta::new_readonly(vault.address, false),
            AccountMeta::new_readonly(lp_mint, false),
            AccountMeta::new(user_lp_ata, false),
            AccountMeta::new(receipt_lp_ata, false),
            AccountMeta::new(receipt, false),
            AccountMeta::new_readonly(spl_associated_token_account::id(), false),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(system_program::id(), false),
        ];

        let args = RequestWithdrawVaultArgs {
            amount: chunk.amount,
            is_amount_in_lp: false,
            is_withdraw_all: chunk.is_withdraw_all,
        };
        Ok(Instruction {
            program_id: self.program_id,
            accounts,
            data: instruction_data("request_withdraw_vault", &args)?,
        })
    }

    fn direct_withdraw_strategy(
        &self,
        vault: &Vault,
        strategy: &Strategy,
        user: &Pubkey,
        user_asset_ata: &Pubkey,
        remaining: &RemainingAccountSet,
    ) -> Result<Instruction, WithdrawError> {
        let program_id = &self.program_id;
        let protocol = pda::get_protocol(program_id);
        let lp_mint = pda::get_vault_lp_mint(&vault.address, program_id);
        let receipt = pda::get_request_withdraw_vault_receipt(&vault.address, user, program_id);
        let receipt_lp_ata =
            get_associated_token_address_with_program_id(&receipt, &lp_mint, &spl_token::id());
        let strategy_auth = pda::get_vault_strategy_auth(&vault.address, &strategy.address, program_id);
        let strategy_asset_ata = get_associated_token_address_with_program_id(
            &strategy_auth,
            &vault.asset_mint,
            &vault.asset_token_program,
        );

        let mut accounts = vec![
            AccountMeta::new(*user, true),
            AccountMeta::new_readonly(protocol, false),
            AccountMeta::new(vault.address, false),
            AccountMeta::new_readonly(strategy.address, false),
            AccountMeta::new_readonly(strategy.adaptor_program, false),
            AccountMeta::new_readonly(vault.asset_mint, false),
            AccountMeta::new(lp_mint, false),
            AccountMeta::new(receipt_lp_ata, false),
            AccountMeta::new(strategy_auth, false),
            AccountMeta::new_readonly(
                pda::get_direct_withdraw_init_receipt(&vault.address, &strategy.address, program_id),
                false,
            ),
            AccountMeta::new(
                pda::get_strategy_init_receipt(&vault.address, &strategy.address, program_id),
                false,
            ),
            AccountMeta::new(strategy_asset_ata, false),
            AccountMeta::new(*user_asset_ata, false),
            AccountMeta::new(receipt, false),
            AccountMeta::new_readonly(vault.asset_token_program, false),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(system_program::id(), false),
        ];
        accounts.extend(remaining.accounts.iter().cloned());

        let args = DirectWithdrawStrategyArgs { user_args: None };
        Ok(Instruction {
            program_id: self.program_id,
            accounts,
            data: instruction_data("direct_withdraw_strategy", &args)?,
        })
    }
}

fn instruction_data(name: &str, args: &impl BorshSerialize) -> Result<Vec<u8>, WithdrawError> {
    let mut data = instruction_discriminator(name).to_vec();
    args.serialize(&mut data)
        .map_err(|e| WithdrawError::InvalidState(format!("encoding {} args: {}", name, e)))?;
    Ok(data)
}
