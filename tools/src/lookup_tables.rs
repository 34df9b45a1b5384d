use crate::{chain::ChainReader, error::WithdrawError};
use log::{debug, warn};
use solana_sdk::{
    address_lookup_table::{state::AddressLookupTable, AddressLookupTableAccount},
    pubkey::Pubkey,
};

/// Fetches and decodes address lookup tables for transaction compilation.
///
/// Tables that do not exist are skipped, so the result may be shorter than
/// `addresses`. A table that exists but does not decode is an error.
pub async fn fetch_lookup_tables(
    reader: &dyn ChainReader,
    addresses: &[Pubkey],
) -> Result<Vec<AddressLookupTableAccount>, WithdrawError> {
    let accounts = reader.get_multiple_accounts(addresses).await?;

    let mut tables = Vec::with_capacity(addresses.len());
    for (address, account) in addresses.iter().zip(accounts) {
        let Some(account) = account else {
            warn!("Lookup table {} not found, skipping", address);
            continue;
        };
        let table = AddressLookupTable::deserialize(&account.data).map_err(|e| {
            WithdrawError::ExternalStateUnavailable {
                account: *address,
                reason: format!("invalid lookup table: {}", e),
            }
        })?;
        debug!("Lookup table {} holds {} addresses", address, table.addresses.len());
        tables.push(AddressLookupTableAccount {
            key: *address,
            addresses: table.addresses.to_vec(),
        });
    }

    Ok(tables)
}
