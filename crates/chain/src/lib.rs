//! Liquidator chain interaction layer.
//!
//! This crate provides:
//! - The [`LendingLedger`] interface the liquidation loop is written against
//! - Contract bindings for the lending pool and the liquidator agent
//! - Provider management for the JSON-RPC endpoint
//! - Transaction signing and sending
//! - Startup deployment of the swapper and agent contracts

mod agent;
mod contracts;
pub mod deploy;
mod error;
mod ledger;
mod provider;
mod signer;

pub use agent::LiquidatorAgent;
pub use contracts::{encode_liquidation, ILendingPool, ILiquidatorAgent};
pub use deploy::{deploy_liquidator_agent, ContractArtifact, DeployedAgent, DeploymentParams};
pub use error::LedgerError;
pub use ledger::{LendingLedger, LiquidationReceipt, ReserveDebt};
pub use provider::ProviderManager;
pub use signer::{SentTransaction, TransactionSender};
