use super::{ProtocolAccountResolver, ResolveContext};
use crate::{chain::ChainReader, constants::*, error::WithdrawError, state::RemainingAccountSet};
use async_trait::async_trait;
use solana_sdk::{instruction::AccountMeta, pubkey::Pubkey, system_program};

/// Jupiter Lend earn position. Every account is a PDA or ATA, so nothing is read.
pub struct JupiterResolver;

fn find(seeds: &[&[u8]], program_id: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(seeds, program_id).0
}

#[async_trait]
impl ProtocolAccountResolver for JupiterResolver {
    async fn resolve_accounts(
        &self,
        _reader: &dyn ChainReader,
        ctx: &ResolveContext,
    ) -> Result<RemainingAccountSet, WithdrawError> {
        let lending = ctx.strategy;
        let mint = ctx.asset_mint.as_ref();

        let f_token_mint = find(&[JUPITER_F_TOKEN_MINT_SEED, mint], &JUPITER_LEND_PROGRAM_ID);
        let lending_admin = find(&[JUPITER_LENDING_ADMIN_SEED], &JUPITER_LEND_PROGRAM_ID);
        let supply_token_reserves_liquidity =
            find(&[JUPITER_RESERVE_SEED, mint], &JUPITER_LIQUIDITY_PROGRAM_ID);
        let rate_model = find(&[JUPITER_RATE_MODEL_SEED, mint], &JUPITER_LIQUIDITY_PROGRAM_ID);
        let user_claim = find(
            &[JUPITER_USER_CLAIM_SEED, lending_admin.as_ref(), mint],
            &JUPITER_LIQUIDITY_PROGRAM_ID,
        );
        let liquidity = find(&[JUPITER_LIQUIDITY_SEED], &JUPITER_LIQUIDITY_PROGRAM_ID);
        let rewards_rate_model = find(
            &[JUPITER_REWARDS_RATE_MODEL_SEED, mint],
            &JUPITER_REWARDS_RATE_PROGRAM_ID,
        );
        let supply_position = find(
            &[JUPITER_USER_SUPPLY_POSITION_SEED, mint, lending.as_ref()],
            &JUPITER_LIQUIDITY_PROGRAM_ID,
        );
        let liquidity_vault =
            spl_associated_token_account::get_associated_token_address_with_program_id(
                &liquidity,
                &ctx.asset_mint,
                &ctx.asset_token_program,
            );
        let strategy_f_token_ata =
            spl_associated_token_account::get_associated_token_address_with_program_id(
                &ctx.strategy_authority,
                &f_token_mint,
                &spl_token::id(),
            );

        let accounts = vec![
            AccountMeta::new(lending, false),
            AccountMeta::new(strategy_f_token_ata, false),
            AccountMeta::new_readonly(lending_admin, false),
            AccountMeta::new(f_token_mint, false),
            AccountMeta::new(supply_token_reserves_liquidity, false),
            AccountMeta::new(supply_position, false),
            AccountMeta::new_readonly(rate_model, false),
            AccountMeta::new(liquidity_vault, false),
            AccountMeta::new(user_claim, false),
            AccountMeta::new(liquidity, false),
            AccountMeta::new(JUPITER_LIQUIDITY_PROGRAM_ID, false),
            AccountMeta::new_readonly(rewards_rate_model, false),
            AccountMeta::new_readonly(spl_associated_token_account::id(), false),
            AccountMeta::new(system_program::id(), false),
            AccountMeta::new(JUPITER_LEND_PROGRAM_ID, false),
        ];

        Ok(RemainingAccountSet {
            accounts,
            lookup_tables: Vec::new(),
        })
    }
}
