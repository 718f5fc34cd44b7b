//! Configuration for the liquidation agent.
//!
//! Runtime behaviour (timing, lookup bounds, repay policy, watchlist) is
//! loaded from a TOML file or a built-in profile. Network endpoints and
//! contract addresses come from the environment and are handled by the binary.

mod agent;

pub use agent::{AgentConfig, LiquidationConfig, LocatorConfig, ScannerConfig, WatchlistConfig};
