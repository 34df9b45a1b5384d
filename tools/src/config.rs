//! Direct-withdrawal configuration: which vaults support it and their strategies.
//!
//! ```json
//! {
//!   "vaults": [{
//!     "address": "8oUwteX3SJELMGDPTEuLqz1WSd58yMdkQ6s4hKwB42nJ",
//!     "lookup_table": "5UCZAkmBCfrU7qDzKZ5UiBL9JupUFftW2xMt2Eex6xop",
//!     "strategies": [
//!       { "address": "...", "adaptor_program": "...", "protocol": "drift", "market_index": 0 }
//!     ]
//!   }]
//! }
//! ```

use crate::{constants::*, error::WithdrawError, state::{ProtocolKind, Strategy}};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub vaults: Vec<VaultEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultEntry {
    #[serde(with = "pubkey_string")]
    pub address: Pubkey,
    /// Vault-level lookup table, always the first table of a withdrawal
    #[serde(with = "pubkey_string")]
    pub lookup_table: Pubkey,
    pub strategies: Vec<StrategyEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyEntry {
    #[serde(with = "pubkey_string")]
    pub address: Pubkey,
    #[serde(with = "pubkey_string")]
    pub adaptor_program: Pubkey,
    /// One of `kamino`, `drift`, `jupiter`
    pub protocol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_index: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_account_id: Option<u16>,
}

impl StrategyEntry {
    fn new(address: Pubkey, adaptor_program: Pubkey, protocol: ProtocolKind) -> Self {
        let (market_index, sub_account_id) = match protocol {
            ProtocolKind::Drift {
                market_index,
                sub_account_id,
            } => (Some(market_index), Some(sub_account_id)),
            ProtocolKind::Kamino | ProtocolKind::Jupiter => (None, None),
        };
        Self {
            address,
            adaptor_program,
            protocol: protocol.name().to_string(),
            market_index,
            sub_account_id,
        }
    }

    /// Parses the protocol tag and its parameters.
    ///
    /// # Errors
    /// * `UnsupportedProtocolType` for a tag with no resolver
    /// * `Config` when a Drift strategy has no market index
    pub fn protocol_kind(&self) -> Result<ProtocolKind, WithdrawError> {
        match self.protocol.as_str() {
            "kamino" => Ok(ProtocolKind::Kamino),
            "jupiter" => Ok(ProtocolKind::Jupiter),
            "drift" => {
                let market_index = self.market_index.ok_or_else(|| {
                    WithdrawError::Config(format!(
                        "drift strategy {} is missing market_index",
                        self.address
                    ))
                })?;
                Ok(ProtocolKind::Drift {
                    market_index,
                    sub_account_id: self.sub_account_id.unwrap_or(0),
                })
            }
            other => Err(WithdrawError::UnsupportedProtocolType(other.to_string())),
        }
    }
}

impl VaultEntry {
    pub fn strategies(&self) -> Result<Vec<Strategy>, WithdrawError> {
        self.strategies
            .iter()
            .map(|entry| {
                Ok(Strategy {
                    address: entry.address,
                    vault: self.address,
                    protocol: entry.protocol_kind()?,
                    adaptor_program: entry.adaptor_program,
                })
            })
            .collect()
    }
}

impl EngineConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, WithdrawError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| WithdrawError::Config(format!("reading {}: {}", path.display(), e)))?;
        Self::from_json_str(&raw)
    }

    /// Parses and validates a configuration document. Every strategy must name a
    /// supported protocol and each vault may appear only once.
    pub fn from_json_str(raw: &str) -> Result<Self, WithdrawError> {
        let config: EngineConfig =
            serde_json::from_str(raw).map_err(|e| WithdrawError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), WithdrawError> {
        for (i, vault) in self.vaults.iter().enumerate() {
            if self.vaults[..i].iter().any(|v| v.address == vault.address) {
                return Err(WithdrawError::Config(format!(
                    "vault {} is configured twice",
                    vault.address
                )));
            }
            vault.strategies()?;
        }
        Ok(())
    }

    pub fn vault(&self, address: &Pubkey) -> Option<&VaultEntry> {
        self.vaults.iter().find(|vault| &vault.address == address)
    }

    /// Built-in table for the mainnet USDC vault.
    pub fn mainnet_default() -> Self {
        Self {
            vaults: vec![VaultEntry {
                address: MAINNET_USDC_VAULT,
                lookup_table: MAINNET_USDC_VAULT_LOOKUP_TABLE,
                strategies: vec![
                    StrategyEntry::new(
                        KAMINO_TURBO_USDC_STRATEGY,
                        KAMINO_ADAPTOR_PROGRAM_ID,
                        ProtocolKind::Kamino,
                    ),
                    StrategyEntry::new(
                        DRIFT_MAIN_USDC_STRATEGY,
                        DRIFT_ADAPTOR_PROGRAM_ID,
                        ProtocolKind::Drift {
                            market_index: 0,
                            sub_account_id: 0,
                        },
                    ),
                    StrategyEntry::new(
                        DRIFT_JLP_USDC_STRATEGY,
                        DRIFT_ADAPTOR_PROGRAM_ID,
                        ProtocolKind::Drift {
                            market_index: 34,
                            sub_account_id: 0,
                        },
                    ),
                    StrategyEntry::new(
                        JUPITER_LEND_USDC_STRATEGY,
                        JUPITER_ADAPTOR_PROGRAM_ID,
                        ProtocolKind::Jupiter,
                    ),
                ],
            }],
        }
    }
}

/// Base58 string encoding for `Pubkey` fields.
mod pubkey_string {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use solana_sdk::pubkey::Pubkey;
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(key: &Pubkey, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&key.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Pubkey, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Pubkey::from_str(&raw).map_err(|e| D::Error::custom(format!("{}: {}", raw, e)))
    }
}
