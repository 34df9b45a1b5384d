//! Off-chain withdrawal routing for multi-strategy vaults.
//!
//! A withdrawal is split across the vault's strategies largest position
//! first ([`allocator`]), each strategy's protocol accounts are resolved from
//! live chain state ([`resolver`]), and the result is composed into an
//! unsigned instruction sequence ([`builder`]). [`service::DirectWithdrawalService`]
//! runs the whole pipeline.

pub mod allocator;
pub mod builder;
pub mod chain;
pub mod config;
pub mod constants;
pub mod error;
pub mod layout;
pub mod lookup_tables;
pub mod registry;
pub mod resolver;
pub mod service;
pub mod state;

pub use allocator::{allocate, WithdrawalAllocator};
pub use builder::{InstructionSequenceBuilder, WithdrawalInstructions};
pub use chain::{ChainReader, MemoryChainReader, RpcChainReader};
pub use config::EngineConfig;
pub use error::WithdrawError;
pub use registry::StrategyRegistry;
pub use resolver::{ProtocolAccountResolver, ResolveContext};
pub use service::{DirectWithdrawal, DirectWithdrawalService};
pub use state::*;
