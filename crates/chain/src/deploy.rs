//! Startup deployment of the supporting contracts.
//!
//! Deploys the `Swapper` helper and the `LiquidatorAgent` that uses it from
//! compiled Hardhat artifacts. Any failure here is fatal for the process.

use alloy::primitives::{Address, Bytes};
use alloy::sol_types::SolValue;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::signer::TransactionSender;

/// Compiled contract artifact (Hardhat `artifacts/contracts/<Name>.sol/<Name>.json`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    pub contract_name: String,
    /// Creation bytecode as a 0x-prefixed hex string
    pub bytecode: String,
}

impl ContractArtifact {
    /// Load an artifact from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read artifact {:?}", path))?;
        Self::from_json(&content).with_context(|| format!("Invalid artifact {:?}", path))
    }

    /// Parse an artifact from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: Self = serde_json::from_str(json)?;
        Ok(artifact)
    }

    /// Decoded creation bytecode.
    pub fn creation_code(&self) -> Result<Vec<u8>> {
        let code = hex::decode(self.bytecode.trim_start_matches("0x"))
            .with_context(|| format!("{} bytecode is not valid hex", self.contract_name))?;
        if code.is_empty() {
            anyhow::bail!(
                "{} has no creation bytecode (abstract contract or interface?)",
                self.contract_name
            );
        }
        Ok(code)
    }

    /// Creation bytecode with ABI-encoded constructor arguments appended.
    pub fn init_code(&self, constructor_args: &[u8]) -> Result<Bytes> {
        let mut code = self.creation_code()?;
        code.extend_from_slice(constructor_args);
        Ok(Bytes::from(code))
    }
}

/// Inputs for provisioning the agent.
#[derive(Debug, Clone)]
pub struct DeploymentParams {
    /// Hardhat `artifacts` directory, or a flat directory holding
    /// `Swapper.json` and `LiquidatorAgent.json`
    pub artifacts_dir: PathBuf,
    /// DEX router the swapper trades through
    pub swap_router: Address,
    /// Aave `LendingPoolAddressesProvider`
    pub lending_pool_address_provider: Address,
}

impl DeploymentParams {
    /// Hardhat's `contracts/<Name>.sol/<Name>.json`, else `<Name>.json`.
    fn artifact_path(&self, name: &str) -> PathBuf {
        let nested = self
            .artifacts_dir
            .join("contracts")
            .join(format!("{}.sol", name))
            .join(format!("{}.json", name));
        if nested.is_file() {
            return nested;
        }

        let flat = self.artifacts_dir.join(format!("{}.json", name));
        if flat.is_file() {
            flat
        } else {
            nested
        }
    }

    fn artifact(&self, name: &str) -> Result<ContractArtifact> {
        ContractArtifact::from_file(self.artifact_path(name))
    }
}

/// Addresses of the freshly deployed contracts.
#[derive(Debug, Clone, Copy)]
pub struct DeployedAgent {
    pub swapper: Address,
    pub agent: Address,
}

/// Deploy `Swapper(swapRouter)` and then
/// `LiquidatorAgent(lendingPoolAddressProvider, swapper)`.
pub async fn deploy_liquidator_agent(
    sender: &TransactionSender,
    params: &DeploymentParams,
) -> Result<DeployedAgent> {
    let swapper_artifact = params.artifact("Swapper")?;
    let agent_artifact = params.artifact("LiquidatorAgent")?;

    let swapper_code = swapper_artifact.init_code(&(params.swap_router,).abi_encode_params())?;
    let swapper = deploy_contract(sender, "Swapper", swapper_code).await?;

    let agent_code = agent_artifact.init_code(
        &(params.lending_pool_address_provider, swapper).abi_encode_params(),
    )?;
    let agent = deploy_contract(sender, "LiquidatorAgent", agent_code).await?;

    Ok(DeployedAgent { swapper, agent })
}

async fn deploy_contract(sender: &TransactionSender, name: &str, init_code: Bytes) -> Result<Address> {
    let sent = sender
        .deploy(init_code)
        .await
        .with_context(|| format!("Failed to deploy {}", name))?;

    if !sent.success {
        anyhow::bail!("{} deployment reverted: {}", name, sent.tx_hash);
    }

    let address = sent
        .contract_address
        .ok_or_else(|| anyhow::anyhow!("{} deployment receipt has no contract address", name))?;

    info!(contract = name, address = %address, tx_hash = %sent.tx_hash, "Contract deployed");
    Ok(address)
}
