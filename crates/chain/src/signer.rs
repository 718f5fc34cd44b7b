//! Transaction signer and sender.
//! Uses Alloy providers for type-safe RPC interactions.
//!
//! The nonce is tracked locally so back-to-back transactions (the two
//! deployments at startup, consecutive liquidations) do not race the
//! node's pending-nonce view. It is resynced from chain after any failure.

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, B256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use anyhow::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Cached nonce manager.
pub struct NonceManager {
    /// Next nonce to hand out
    current: AtomicU64,
}

impl NonceManager {
    /// Create new nonce manager with initial value from chain.
    pub fn new(initial_nonce: u64) -> Self {
        Self {
            current: AtomicU64::new(initial_nonce),
        }
    }

    /// Get next nonce and increment counter.
    #[inline]
    pub fn next(&self) -> u64 {
        self.current.fetch_add(1, Ordering::SeqCst)
    }

    /// Get current nonce without incrementing.
    #[inline]
    pub fn current(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }

    /// Reset nonce to chain value (use after tx failure).
    pub fn reset(&self, chain_nonce: u64) {
        self.current.store(chain_nonce, Ordering::SeqCst);
    }
}

/// A mined transaction.
#[derive(Debug, Clone)]
pub struct SentTransaction {
    pub tx_hash: B256,
    /// Receipt status (false = reverted)
    pub success: bool,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    /// Set for contract creations
    pub contract_address: Option<Address>,
}

/// Transaction sender bound to one signer and one RPC endpoint.
pub struct TransactionSender {
    /// RPC URL for sending transactions
    rpc_url: String,
    /// Signer wallet
    wallet: EthereumWallet,
    /// Signer address
    pub address: Address,
    /// Chain ID
    chain_id: u64,
    /// Cached nonce manager
    nonce_manager: NonceManager,
}

impl TransactionSender {
    /// Create a new transaction sender from a hex private key (with or without 0x).
    pub async fn new(private_key: &str, rpc_url: &str, chain_id: u64) -> Result<Self> {
        let key_str = private_key.trim_start_matches("0x");
        let signer: PrivateKeySigner = key_str.parse()?;
        let address = signer.address();
        let wallet = EthereumWallet::from(signer);

        let provider = ProviderBuilder::new().on_http(rpc_url.parse()?);
        let initial_nonce = provider.get_transaction_count(address).await?;

        info!(
            address = %address,
            chain_id = chain_id,
            initial_nonce = initial_nonce,
            "Transaction sender initialized"
        );

        Ok(Self {
            rpc_url: rpc_url.to_string(),
            wallet,
            address,
            chain_id,
            nonce_manager: NonceManager::new(initial_nonce),
        })
    }

    /// Send a call to `to` and wait for its receipt.
    ///
    /// A reverted transaction is returned with `success == false`; only
    /// submission and confirmation failures are errors.
    pub async fn send_transaction(&self, to: Address, calldata: Bytes) -> Result<SentTransaction> {
        debug!(to = %to, calldata_len = calldata.len(), "Preparing transaction");

        let tx = TransactionRequest::default().with_to(to).with_input(calldata);
        self.submit(tx).await
    }

    /// Deploy `init_code` (bytecode followed by ABI-encoded constructor args).
    pub async fn deploy(&self, init_code: Bytes) -> Result<SentTransaction> {
        debug!(code_len = init_code.len(), "Preparing deployment");

        let tx = TransactionRequest::default().with_deploy_code(init_code);
        self.submit(tx).await
    }

    async fn submit(&self, tx: TransactionRequest) -> Result<SentTransaction> {
        let total_start = Instant::now();
        let nonce = self.nonce_manager.next();
        let tx = tx.with_nonce(nonce).with_chain_id(self.chain_id);

        let provider = ProviderBuilder::new()
            .wallet(self.wallet.clone())
            .on_http(self.rpc_url.parse()?);

        let pending = match provider.send_transaction(tx).await {
            Ok(pending) => pending,
            Err(e) => {
                warn!(nonce = nonce, error = %e, "Transaction submission failed, syncing nonce");
                self.sync_nonce().await;
                return Err(e.into());
            }
        };
        let tx_hash = *pending.tx_hash();

        info!(tx_hash = %tx_hash, nonce = nonce, "Transaction submitted, waiting for confirmation");

        let receipt = match pending.get_receipt().await {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(tx_hash = %tx_hash, error = %e, "Failed to confirm transaction");
                self.sync_nonce().await;
                return Err(e.into());
            }
        };

        let sent = SentTransaction {
            tx_hash,
            success: receipt.status(),
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            contract_address: receipt.contract_address,
        };

        if sent.success {
            info!(
                tx_hash = %tx_hash,
                block = sent.block_number.unwrap_or(0),
                gas_used = sent.gas_used,
                total_ms = total_start.elapsed().as_millis(),
                "Transaction confirmed"
            );
        } else {
            warn!(
                tx_hash = %tx_hash,
                total_ms = total_start.elapsed().as_millis(),
                "Transaction reverted, syncing nonce"
            );
            self.sync_nonce().await;
        }

        Ok(sent)
    }

    /// Sync nonce from chain (call on error).
    pub async fn sync_nonce(&self) {
        let provider = match self.rpc_url.parse() {
            Ok(url) => ProviderBuilder::new().on_http(url),
            Err(e) => {
                warn!(error = %e, "Invalid RPC URL, nonce not synced");
                return;
            }
        };
        match provider.get_transaction_count(self.address).await {
            Ok(chain_nonce) => {
                self.nonce_manager.reset(chain_nonce);
                debug!(nonce = chain_nonce, "Nonce synced from chain");
            }
            Err(e) => {
                warn!(error = %e, "Failed to sync nonce from chain");
            }
        }
    }

    /// Get current cached nonce.
    pub fn current_nonce(&self) -> u64 {
        self.nonce_manager.current()
    }
}

impl std::fmt::Debug for TransactionSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionSender")
            .field("address", &self.address)
            .field("chain_id", &self.chain_id)
            .field("rpc_url", &self.rpc_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonce_manager() {
        let manager = NonceManager::new(10);

        assert_eq!(manager.current(), 10);
        assert_eq!(manager.next(), 10);
        assert_eq!(manager.next(), 11);
        assert_eq!(manager.current(), 12);

        // Reset after a failed send rewinds to the chain's view
        manager.reset(11);
        assert_eq!(manager.next(), 11);
    }

    #[tokio::test]
    #[ignore] // Requires a local node
    async fn test_sender_creation() {
        // Well-known local development key (DO NOT USE IN PRODUCTION)
        let private_key = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
        let sender = TransactionSender::new(private_key, "http://127.0.0.1:8545", 31337)
            .await
            .unwrap();

        assert_eq!(
            format!("{:?}", sender.address).to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }
}
