//! Provider management for the JSON-RPC endpoint.
//! Uses Alloy providers for type-safe RPC interactions.

use alloy::providers::{Provider, ProviderBuilder};
use anyhow::{Context, Result};
use tracing::{debug, info};

/// Provider manager for the node the agent reads from.
///
/// Providers are cheap to build, so one is created per call rather than
/// holding a long-lived connection.
#[derive(Debug, Clone)]
pub struct ProviderManager {
    /// HTTP RPC URL
    rpc_url: String,
}

impl ProviderManager {
    /// Create a provider manager and verify the endpoint answers.
    pub async fn new(rpc_url: &str) -> Result<Self> {
        info!(rpc = rpc_url, "Initializing provider manager");

        let manager = Self {
            rpc_url: rpc_url.to_string(),
        };

        let block = manager
            .block_number()
            .await
            .with_context(|| format!("RPC endpoint {} unreachable", rpc_url))?;
        info!(block = block, "Provider connection verified");

        Ok(manager)
    }

    /// Get the RPC URL.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Get current block number.
    pub async fn block_number(&self) -> Result<u64> {
        let provider = ProviderBuilder::new().on_http(self.rpc_url.parse()?);
        let block = provider.get_block_number().await?;
        Ok(block)
    }

    /// Get chain ID reported by the node.
    pub async fn chain_id(&self) -> Result<u64> {
        let provider = ProviderBuilder::new().on_http(self.rpc_url.parse()?);
        let chain_id = provider.get_chain_id().await?;
        Ok(chain_id)
    }

    /// Fail unless the node serves `expected` chain ID.
    pub async fn ensure_chain_id(&self, expected: u64) -> Result<()> {
        let actual = self.chain_id().await?;
        if actual != expected {
            anyhow::bail!(
                "RPC endpoint serves chain {} but chain {} is configured",
                actual,
                expected
            );
        }
        debug!(chain_id = actual, "Chain ID verified");
        Ok(())
    }
}
