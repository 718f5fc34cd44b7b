//! Flash-Loan Liquidation Agent
//!
//! Watches a fixed set of accounts on an Aave-style lending pool and
//! liquidates the ones that become eligible through a deployed
//! `LiquidatorAgent` contract, one at a time:
//! - Deploys the swapper and agent contracts at startup (or reuses an agent)
//! - Scans the watchlist every few seconds
//! - Locates collateral and debt reserves per account
//! - Repays half the debt with a flash loan and swaps the seized collateral back

use std::path::PathBuf;
use std::sync::Arc;

use alloy::primitives::Address;
use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use liquidator_chain::{
    deploy_liquidator_agent, DeploymentParams, LendingLedger, LiquidatorAgent, ProviderManager,
    TransactionSender,
};
use liquidator_core::{AgentConfig, LiquidationCounter, Scheduler, Watchlist};

/// Environment variable names.
mod env {
    pub const RPC_URL: &str = "RPC_URL";
    pub const PRIVATE_KEY: &str = "PRIVATE_KEY";
    pub const CHAIN_ID: &str = "CHAIN_ID";
    pub const LENDING_POOL: &str = "LENDING_POOL";
    pub const LENDING_POOL_ADDRESS_PROVIDER: &str = "LENDING_POOL_ADDRESS_PROVIDER";
    pub const SWAP_ROUTER: &str = "SWAP_ROUTER";
    pub const ARTIFACTS_DIR: &str = "ARTIFACTS_DIR";
    pub const LIQUIDATOR_AGENT: &str = "LIQUIDATOR_AGENT";
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
}

#[tokio::main]
async fn main() -> Result<()> {
    print_banner();

    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    // AGENT_CONFIG=<file.toml> or AGENT_PROFILE=testing|production|default
    let agent_config = AgentConfig::from_env()?;
    agent_config.validate()?;
    agent_config.log_config();

    let config = load_config()?;

    let provider = Arc::new(ProviderManager::new(&config.rpc_url).await?);
    provider.ensure_chain_id(config.chain_id).await?;

    let sender =
        Arc::new(TransactionSender::new(&config.private_key, &config.rpc_url, config.chain_id).await?);
    info!(address = %sender.address, nonce = sender.current_nonce(), "Signer ready");

    let agent_address = match &config.agent {
        AgentSource::Existing(address) => {
            info!(agent = %address, "Using existing liquidator agent");
            *address
        }
        AgentSource::Deploy(params) => {
            info!("Deploying swapper and liquidator agent...");
            let deployed = deploy_liquidator_agent(&sender, params).await?;
            info!(
                swapper = %deployed.swapper,
                agent = %deployed.agent,
                "Liquidator agent deployed"
            );
            deployed.agent
        }
    };

    let ledger: Arc<dyn LendingLedger> = Arc::new(LiquidatorAgent::new(
        agent_address,
        config.lending_pool,
        Arc::clone(&provider),
        Arc::clone(&sender),
    ));

    let watchlist = Watchlist::from_config(&agent_config.watchlist)?;
    if watchlist.is_empty() {
        warn!("Watchlist is empty, nothing will ever be liquidated");
    }

    let counter = Arc::new(LiquidationCounter::new());
    let scheduler = Scheduler::new(ledger, watchlist, &agent_config, Arc::clone(&counter))?;

    tokio::select! {
        _ = scheduler.run() => {}
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutdown requested");
        }
    }

    info!(total_liquidations = counter.get(), "Liquidation agent stopped");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,liquidator_core=debug,liquidator_chain=debug"));

    let json = std::env::var(env::LOG_FORMAT)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }
}

/// Configuration loaded from environment.
struct Config {
    rpc_url: String,
    private_key: String,
    chain_id: u64,
    lending_pool: Address,
    agent: AgentSource,
}

/// Where the liquidator agent comes from.
enum AgentSource {
    /// `LIQUIDATOR_AGENT` names an already deployed agent
    Existing(Address),
    /// Deploy the swapper and agent at startup
    Deploy(DeploymentParams),
}

fn load_config() -> Result<Config> {
    load_config_from(|name| std::env::var(name).ok())
}

fn load_config_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Config> {
    let get_env = |name: &str| -> Result<String> {
        lookup(name).ok_or_else(|| anyhow::anyhow!("Missing env var: {}", name))
    };

    let get_address = |name: &str| -> Result<Address> {
        get_env(name)?
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid address for {}: {}", name, e))
    };

    let chain_id = get_env(env::CHAIN_ID)?
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid {}: {}", env::CHAIN_ID, e))?;

    // Deployment inputs are only needed when no agent is configured.
    let agent = match lookup(env::LIQUIDATOR_AGENT) {
        Some(v) if !v.trim().is_empty() => AgentSource::Existing(get_address(env::LIQUIDATOR_AGENT)?),
        _ => AgentSource::Deploy(DeploymentParams {
            artifacts_dir: PathBuf::from(
                get_env(env::ARTIFACTS_DIR).unwrap_or_else(|_| "artifacts".to_string()),
            ),
            swap_router: get_address(env::SWAP_ROUTER)?,
            lending_pool_address_provider: get_address(env::LENDING_POOL_ADDRESS_PROVIDER)?,
        }),
    };

    Ok(Config {
        rpc_url: get_env(env::RPC_URL).unwrap_or_else(|_| "http://127.0.0.1:8545".to_string()),
        private_key: get_env(env::PRIVATE_KEY)?,
        chain_id,
        lending_pool: get_address(env::LENDING_POOL)?,
        agent,
    })
}

/// Print startup banner.
fn print_banner() {
    println!(
        r#"
    ╔═╗┬  ┌─┐┌─┐┬ ┬  ╦  ┬┌─┐ ┬ ┬┬┌┬┐┌─┐┌┬┐┌─┐┬─┐
    ╠╣ │  ├─┤└─┐├─┤  ║  ││─┼┐│ ││ ││├─┤ │ │ │├┬┘
    ╚  ┴─┘┴ ┴└─┘┴ ┴  ╩═╝┴└─┘└└─┘┴─┴┘┴ ┴ ┴ └─┘┴└─
    Flash-Loan Liquidation Agent v0.1.0
    "#
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    const BASE: [(&str, &str); 3] = [
        ("PRIVATE_KEY", "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"),
        ("CHAIN_ID", "31337"),
        ("LENDING_POOL", "0x7d2768dE32b0b80b7a3454c06BdAc94A69DDc7A9"),
    ];

    #[test]
    fn test_existing_agent_needs_no_deployment_inputs() {
        let mut vars = BASE.to_vec();
        vars.push(("LIQUIDATOR_AGENT", "0x0000000000000000000000000000000000000abc"));

        let config = load_config_from(lookup(&vars)).unwrap();
        assert!(matches!(config.agent, AgentSource::Existing(_)));
        assert_eq!(config.rpc_url, "http://127.0.0.1:8545");
    }

    #[test]
    fn test_deploy_requires_router_and_provider() {
        assert!(load_config_from(lookup(&BASE)).is_err());

        let mut vars = BASE.to_vec();
        vars.push(("SWAP_ROUTER", "0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D"));
        vars.push((
            "LENDING_POOL_ADDRESS_PROVIDER",
            "0xB53C1a33016B2DC2fF3653530bfF1848a515c8c5",
        ));
        let config = load_config_from(lookup(&vars)).unwrap();
        let AgentSource::Deploy(params) = config.agent else {
            panic!("expected deployment");
        };
        assert_eq!(params.artifacts_dir, PathBuf::from("artifacts"));
    }
}
