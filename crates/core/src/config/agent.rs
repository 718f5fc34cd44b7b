//! Agent runtime configuration with profile support.
//!
//! Every knob of the scan → locate → execute loop lives here: tick period,
//! eligibility fan-out, reserve window size and hard limit, repay policy,
//! and the watchlist itself.

use alloy::primitives::{Address, U256};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::u256_math::BPS;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Profile name (for logging/identification)
    #[serde(default = "default_profile_name")]
    pub profile: String,

    /// Tick timing and eligibility fan-out
    #[serde(default)]
    pub scanner: ScannerConfig,

    /// Reserve lookup bounds
    #[serde(default)]
    pub locator: LocatorConfig,

    /// Repay amount policy
    #[serde(default)]
    pub liquidation: LiquidationConfig,

    /// Accounts to monitor
    #[serde(default)]
    pub watchlist: WatchlistConfig,
}

fn default_profile_name() -> String {
    "default".to_string()
}

/// Scheduler timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Pause between the end of one cycle and the start of the next (milliseconds)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Maximum in-flight eligibility queries
    #[serde(default = "default_eligibility_concurrency")]
    pub eligibility_concurrency: usize,
}

fn default_interval_ms() -> u64 {
    5000
}
fn default_eligibility_concurrency() -> usize {
    8
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            eligibility_concurrency: default_eligibility_concurrency(),
        }
    }
}

impl ScannerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Reserve lookup bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatorConfig {
    /// Reserves per `getUserDebtForReserves` call
    #[serde(default = "default_reserve_check_rate")]
    pub reserve_check_rate: usize,

    /// Exclusive upper bound for collateral indices
    #[serde(default = "default_reserve_hard_limit")]
    pub reserve_hard_limit: u64,
}

fn default_reserve_check_rate() -> usize {
    8
}
fn default_reserve_hard_limit() -> u64 {
    128
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            reserve_check_rate: default_reserve_check_rate(),
            reserve_hard_limit: default_reserve_hard_limit(),
        }
    }
}

/// Repay amount policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidationConfig {
    /// Share of the resolved debt repaid per liquidation (basis points)
    #[serde(default = "default_repay_fraction_bps")]
    pub repay_fraction_bps: u16,

    /// Fixed repay amount (decimal, token base units) overriding the fraction
    #[serde(default)]
    pub fixed_repay_amount: Option<String>,
}

fn default_repay_fraction_bps() -> u16 {
    5000
}

impl Default for LiquidationConfig {
    fn default() -> Self {
        Self {
            repay_fraction_bps: default_repay_fraction_bps(),
            fixed_repay_amount: None,
        }
    }
}

impl LiquidationConfig {
    /// Parsed fixed repay amount, if configured.
    pub fn fixed_amount(&self) -> Result<Option<U256>> {
        self.fixed_repay_amount
            .as_deref()
            .map(|s| {
                U256::from_str_radix(s.trim(), 10)
                    .map_err(|e| anyhow::anyhow!("Invalid fixed_repay_amount '{}': {}", s, e))
            })
            .transpose()
    }
}

/// Monitored accounts, as hex address strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchlistConfig {
    #[serde(default)]
    pub accounts: Vec<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            profile: default_profile_name(),
            scanner: ScannerConfig::default(),
            locator: LocatorConfig::default(),
            liquidation: LiquidationConfig::default(),
            watchlist: WatchlistConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("Invalid config file {}", path))?;
        Ok(config)
    }

    /// Fast cycles against a local fork.
    pub fn testing() -> Self {
        Self {
            profile: "testing".to_string(),
            scanner: ScannerConfig {
                interval_ms: 1000,
                eligibility_concurrency: 4,
            },
            locator: LocatorConfig::default(),
            liquidation: LiquidationConfig::default(),
            watchlist: WatchlistConfig::default(),
        }
    }

    /// Conservative settings for a public RPC endpoint.
    pub fn production() -> Self {
        Self {
            profile: "production".to_string(),
            scanner: ScannerConfig {
                interval_ms: 5000,
                eligibility_concurrency: 16,
            },
            locator: LocatorConfig {
                reserve_check_rate: 16,
                reserve_hard_limit: 128,
            },
            liquidation: LiquidationConfig::default(),
            watchlist: WatchlistConfig::default(),
        }
    }

    /// Resolve configuration from the environment.
    ///
    /// `AGENT_CONFIG` names a TOML file; otherwise `AGENT_PROFILE` selects a
    /// built-in profile (testing, production, default). `WATCHLIST`, a
    /// comma-separated address list, replaces the configured accounts.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("AGENT_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => {
                let profile =
                    std::env::var("AGENT_PROFILE").unwrap_or_else(|_| "default".to_string());
                Self::from_profile(&profile)
            }
        };

        if let Ok(list) = std::env::var("WATCHLIST") {
            config.watchlist.accounts = parse_account_list(&list);
        }

        Ok(config)
    }

    /// Built-in profile by name; unknown names fall back to the default.
    pub fn from_profile(profile: &str) -> Self {
        match profile.to_lowercase().as_str() {
            "testing" | "test" => Self::testing(),
            "production" | "prod" => Self::production(),
            _ => Self::default(),
        }
    }

    /// Reject settings the loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.scanner.interval_ms == 0 {
            anyhow::bail!("scanner.interval_ms must be greater than zero");
        }
        if self.scanner.eligibility_concurrency == 0 {
            anyhow::bail!("scanner.eligibility_concurrency must be greater than zero");
        }
        if self.locator.reserve_check_rate == 0 {
            anyhow::bail!("locator.reserve_check_rate must be greater than zero");
        }
        if self.locator.reserve_hard_limit == 0 {
            anyhow::bail!("locator.reserve_hard_limit must be greater than zero");
        }
        let bps = self.liquidation.repay_fraction_bps;
        if bps == 0 || bps > BPS {
            anyhow::bail!(
                "liquidation.repay_fraction_bps must be within 1..={}, got {}",
                BPS,
                bps
            );
        }
        self.liquidation.fixed_amount()?;
        for account in &self.watchlist.accounts {
            account
                .trim()
                .parse::<Address>()
                .with_context(|| format!("Invalid watchlist account '{}'", account))?;
        }
        Ok(())
    }

    /// Log the current configuration.
    pub fn log_config(&self) {
        tracing::info!(profile = %self.profile, "Agent configuration loaded");
        tracing::info!(
            interval_ms = self.scanner.interval_ms,
            eligibility_concurrency = self.scanner.eligibility_concurrency,
            "Scanner timing"
        );
        tracing::info!(
            reserve_check_rate = self.locator.reserve_check_rate,
            reserve_hard_limit = self.locator.reserve_hard_limit,
            "Reserve lookup bounds"
        );
        tracing::info!(
            repay_fraction_bps = self.liquidation.repay_fraction_bps,
            fixed_repay_amount = self.liquidation.fixed_repay_amount.as_deref().unwrap_or("none"),
            "Liquidation parameters"
        );
        tracing::info!(accounts = self.watchlist.accounts.len(), "Watchlist");
    }
}

fn parse_account_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
