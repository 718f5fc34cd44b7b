//! On-chain ledger backed by a deployed liquidator agent contract.

use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, ProviderBuilder};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::contracts::{encode_liquidation, ILendingPool, ILiquidatorAgent};
use crate::error::LedgerError;
use crate::ledger::{LendingLedger, LiquidationReceipt, ReserveDebt};
use crate::provider::ProviderManager;
use crate::signer::TransactionSender;

/// Liquidator agent handle: reads go through the provider, the liquidation
/// action goes through the transaction sender.
pub struct LiquidatorAgent {
    /// Agent contract address
    pub address: Address,
    /// Lending pool address (reserve list)
    pub lending_pool: Address,
    provider: Arc<ProviderManager>,
    sender: Arc<TransactionSender>,
}

impl LiquidatorAgent {
    /// Create a handle for an agent deployed at `address`.
    pub fn new(
        address: Address,
        lending_pool: Address,
        provider: Arc<ProviderManager>,
        sender: Arc<TransactionSender>,
    ) -> Self {
        Self {
            address,
            lending_pool,
            provider,
            sender,
        }
    }

    /// Read-only provider; a bad URL surfaces as a failed `method` query.
    fn read_provider(&self, method: &'static str) -> Result<impl Provider, LedgerError> {
        let url = self
            .provider
            .rpc_url()
            .parse()
            .map_err(|e| LedgerError::query(method, e))?;
        Ok(ProviderBuilder::new().on_http(url))
    }
}

impl std::fmt::Debug for LiquidatorAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiquidatorAgent")
            .field("address", &self.address)
            .field("lending_pool", &self.lending_pool)
            .field("rpc_url", &self.provider.rpc_url())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl LendingLedger for LiquidatorAgent {
    async fn get_reserves_list(&self) -> Result<Vec<Address>, LedgerError> {
        let provider = self.read_provider("getReservesList")?;
        let pool = ILendingPool::new(self.lending_pool, &provider);

        let reserves = pool
            .getReservesList()
            .call()
            .await
            .map_err(|e| LedgerError::query("getReservesList", e))?
            ._0;

        debug!(count = reserves.len(), "Fetched reserve list");
        Ok(reserves)
    }

    async fn is_user_ready_for_liquidation(&self, user: Address) -> Result<bool, LedgerError> {
        let provider = self.read_provider("isUserReadyForLiquidation")?;
        let agent = ILiquidatorAgent::new(self.address, &provider);

        let ready = agent
            .isUserReadyForLiquidation(user)
            .call()
            .await
            .map_err(|e| LedgerError::query("isUserReadyForLiquidation", e))?
            ._0;

        Ok(ready)
    }

    async fn get_user_debt_for_reserves(
        &self,
        user: Address,
        reserves: &[Address],
    ) -> Result<ReserveDebt, LedgerError> {
        let provider = self.read_provider("getUserDebtForReserves")?;
        let agent = ILiquidatorAgent::new(self.address, &provider);

        let result = agent
            .getUserDebtForReserves(user, reserves.to_vec())
            .call()
            .await
            .map_err(|e| LedgerError::query("getUserDebtForReserves", e))?;

        Ok(ReserveDebt::from_raw(result.debtAmount, result.debtReserve))
    }

    async fn find_user_collateral_index(
        &self,
        user: Address,
        hard_limit: u64,
    ) -> Result<U256, LedgerError> {
        let provider = self.read_provider("findUserCollateralIndex")?;
        let agent = ILiquidatorAgent::new(self.address, &provider);

        let index = agent
            .findUserCollateralIndex(user, U256::from(hard_limit))
            .call()
            .await
            .map_err(|e| LedgerError::query("findUserCollateralIndex", e))?
            ._0;

        Ok(index)
    }

    async fn liquidate_user_with_flash_loan(
        &self,
        user: Address,
        collateral: Address,
        debt: Address,
        amount: U256,
    ) -> Result<LiquidationReceipt, LedgerError> {
        let calldata = encode_liquidation(user, collateral, debt, amount);

        info!(
            contract = %self.address,
            user = %user,
            collateral = %collateral,
            debt = %debt,
            amount = %amount,
            calldata_len = calldata.len(),
            "[CONTRACT] Sending flash loan liquidation"
        );

        let sent = self
            .sender
            .send_transaction(self.address, calldata)
            .await
            .map_err(LedgerError::submission)?;

        if !sent.success {
            return Err(LedgerError::Reverted {
                tx_hash: sent.tx_hash,
            });
        }

        Ok(LiquidationReceipt {
            tx_hash: sent.tx_hash,
            block_number: sent.block_number,
            gas_used: sent.gas_used,
        })
    }
}
