//! Plans a direct withdrawal and prints the resulting instructions. Never signs.
//!
//! ```text
//! plan-withdrawal <config.json|mainnet> <vault> <user> <amount|all>
//! ```

use anyhow::{bail, Context, Result};
use log::info;
use solana_sdk::pubkey::Pubkey;
use std::{str::FromStr, sync::Arc};
use vault_withdraw_tools::{
    lookup_tables::fetch_lookup_tables, DirectWithdrawalService, EngineConfig, RpcChainReader,
    WithdrawalInstructions, WithdrawalRequest,
};

const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 5 {
        bail!("usage: {} <config.json|mainnet> <vault> <user> <amount|all>", args[0]);
    }

    let config = match args[1].as_str() {
        "mainnet" => EngineConfig::mainnet_default(),
        path => EngineConfig::from_path(path).with_context(|| format!("loading {}", path))?,
    };
    let vault = Pubkey::from_str(&args[2]).context("invalid vault address")?;
    let user = Pubkey::from_str(&args[3]).context("invalid user address")?;
    let (amount, is_withdraw_all) = match args[4].as_str() {
        "all" => (0, true),
        raw => (raw.parse::<u64>().context("invalid amount")?, false),
    };

    let rpc_url = std::env::var("SOLANA_RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.to_string());
    info!("Using RPC endpoint {}", rpc_url);
    let reader = Arc::new(RpcChainReader::new(rpc_url));
    let service = DirectWithdrawalService::new(reader.clone(), config);

    if !service.supports_direct_withdrawal(&vault) {
        bail!("vault {} does not support direct withdrawal", vault);
    }

    let request = WithdrawalRequest {
        vault,
        user,
        amount,
        is_withdraw_all,
    };
    let withdrawal = match service.create_direct_withdrawal(&request).await {
        Ok(withdrawal) => withdrawal,
        Err(e) if e.is_user_facing() => bail!("withdrawal unavailable: {}", e),
        Err(e) => return Err(e).context("planning withdrawal"),
    };

    println!("Vault {} ({} decimals)", vault, withdrawal.vault.asset_decimals);
    println!("Amount: {}", withdrawal.amount);
    for chunk in &withdrawal.plan.chunks {
        println!(
            "  {:<44} {:>20} of {:>20}{}",
            chunk.strategy.to_string(),
            chunk.amount,
            chunk.position_value,
            if chunk.is_withdraw_all { " (withdraw all)" } else { "" }
        );
    }

    let budget = WithdrawalInstructions::compute_budget_instruction();
    println!("Instructions:");
    println!("  {} (compute budget)", budget.program_id);
    for ix in &withdrawal.instructions.instructions {
        println!("  {} ({} accounts, {} bytes)", ix.program_id, ix.accounts.len(), ix.data.len());
    }

    let tables =
        fetch_lookup_tables(reader.as_ref(), &withdrawal.instructions.lookup_table_addresses)
            .await
            .context("fetching lookup tables")?;
    println!("Lookup tables:");
    for table in &tables {
        println!("  {} ({} addresses)", table.key, table.addresses.len());
    }

    Ok(())
}
