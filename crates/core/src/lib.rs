//! Liquidator core logic.
//!
//! This crate provides the liquidation loop on top of a [`LendingLedger`]:
//! - Watchlist of monitored accounts
//! - Concurrent eligibility scanning
//! - Windowed debt lookup and direct collateral lookup
//! - Flash-loan liquidation executor
//! - Scheduler with a single-flight guard and a liquidation counter
//!
//! [`LendingLedger`]: liquidator_chain::LendingLedger

pub mod config;
mod eligibility;
mod error;
mod guard;
mod liquidator;
mod locator;
mod position;
mod scheduler;
pub mod u256_math;
mod watchlist;

#[cfg(test)]
mod testing;

pub use config::{AgentConfig, LiquidationConfig, LocatorConfig, ScannerConfig, WatchlistConfig};
pub use eligibility::{EligibilityScan, EligibilityScanner};
pub use error::{AgentError, Stage};
pub use guard::{GuardPermit, LiquidationCounter, LiquidationGuard};
pub use liquidator::{LiquidationExecutor, LiquidationResult};
pub use locator::ReserveLocator;
pub use position::{CollateralPosition, DebtPosition};
pub use scheduler::{CycleState, Scheduler, SkipReason, TickOutcome, TickReport};
pub use watchlist::Watchlist;
