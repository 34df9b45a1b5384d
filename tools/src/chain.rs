//! Read-only access to chain state.

use crate::{constants::MAX_MULTIPLE_ACCOUNTS, error::WithdrawError};
use async_trait::async_trait;
use log::debug;
use solana_account_decoder::UiAccountEncoding;
use solana_client::{nonblocking::rpc_client::RpcClient, rpc_config::RpcAccountInfoConfig};
use solana_sdk::{account::Account, commitment_config::CommitmentConfig, pubkey::Pubkey};
use std::collections::HashMap;

/// Account-data source shared by the registry, the resolvers and the builder.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// `None` when the account does not exist.
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, WithdrawError>;

    /// One entry per requested address, in request order.
    async fn get_multiple_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<Option<Account>>, WithdrawError>;
}

/// [`ChainReader`] over a JSON-RPC endpoint at `confirmed` commitment.
pub struct RpcChainReader {
    client: RpcClient,
}

impl RpcChainReader {
    pub fn new(rpc_url: String) -> Self {
        Self {
            client: RpcClient::new_with_commitment(rpc_url, CommitmentConfig::confirmed()),
        }
    }

    fn account_config(&self) -> RpcAccountInfoConfig {
        RpcAccountInfoConfig {
            encoding: Some(UiAccountEncoding::Base64Zstd),
            commitment: Some(CommitmentConfig::confirmed()),
            ..RpcAccountInfoConfig::default()
        }
    }
}

#[async_trait]
impl ChainReader for RpcChainReader {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, WithdrawError> {
        let response = self
            .client
            .get_account_with_config(address, self.account_config())
            .await?;
        Ok(response.value)
    }

    async fn get_multiple_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<Option<Account>>, WithdrawError> {
        let mut accounts = Vec::with_capacity(addresses.len());
        for chunk in addresses.chunks(MAX_MULTIPLE_ACCOUNTS) {
            debug!("Fetching {} accounts", chunk.len());
            let response = self
                .client
                .get_multiple_accounts_with_config(chunk, self.account_config())
                .await?;
            accounts.extend(response.value);
        }
        Ok(accounts)
    }
}

/// In-memory [`ChainReader`] for tests and offline previews.
#[derive(Debug, Clone, Default)]
pub struct MemoryChainReader {
    accounts: HashMap<Pubkey, Account>,
}

impl MemoryChainReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, address: Pubkey, account: Account) {
        self.accounts.insert(address, account);
    }

    /// Stores `data` under `address` as a rent-paying account owned by `owner`.
    pub fn insert_data(&mut self, address: Pubkey, owner: Pubkey, data: Vec<u8>) {
        self.insert(
            address,
            Account {
                lamports: 1_000_000,
                data,
                owner,
                executable: false,
                rent_epoch: 0,
            },
        );
    }

    pub fn remove(&mut self, address: &Pubkey) -> Option<Account> {
        self.accounts.remove(address)
    }
}

#[async_trait]
impl ChainReader for MemoryChainReader {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, WithdrawError> {
        Ok(self.accounts.get(address).cloned())
    }

    async fn get_multiple_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<Option<Account>>, WithdrawError> {
        Ok(addresses
            .iter()
            .map(|address| self.accounts.get(address).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_reader_preserves_order() {
        let mut reader = MemoryChainReader::new();
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let missing = Pubkey::new_unique();
        reader.insert_data(a, Pubkey::default(), vec![1]);
        reader.insert_data(b, Pubkey::default(), vec![2]);

        let accounts = reader.get_multiple_accounts(&[b, missing, a]).await.unwrap();
        assert_eq!(accounts.len(), 3);
        assert_eq!(accounts[0].as_ref().unwrap().data, vec![2]);
        assert!(accounts[1].is_none());
        assert_eq!(accounts[2].as_ref().unwrap().data, vec![1]);
    }

    #[tokio::test]
    async fn test_memory_reader_remove() {
        let mut reader = MemoryChainReader::new();
        let a = Pubkey::new_unique();
        reader.insert_data(a, Pubkey::default(), vec![]);
        assert!(reader.remove(&a).is_some());
        assert!(reader.get_account(&a).await.unwrap().is_none());
    }
}
