//! Liquidation executor: one flash-loan liquidation per call.

use alloy::primitives::{Address, B256, U256};
use liquidator_chain::LendingLedger;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::config::LiquidationConfig;
use crate::error::AgentError;
use crate::position::{CollateralPosition, DebtPosition};

/// Liquidation executor.
#[derive(Debug, Clone)]
pub struct LiquidationExecutor {
    ledger: Arc<dyn LendingLedger>,

    /// Share of the debt repaid when no amount is given (basis points)
    repay_fraction_bps: u16,

    /// Overrides the fraction when set
    fixed_amount: Option<U256>,
}

impl LiquidationExecutor {
    /// Executor repaying half of the located debt.
    pub fn new(ledger: Arc<dyn LendingLedger>) -> Self {
        Self {
            ledger,
            repay_fraction_bps: 5000,
            fixed_amount: None,
        }
    }

    pub fn from_config(ledger: Arc<dyn LendingLedger>, config: &LiquidationConfig) -> anyhow::Result<Self> {
        Ok(Self::new(ledger)
            .with_repay_fraction(config.repay_fraction_bps)
            .with_fixed_amount(config.fixed_amount()?))
    }

    pub fn with_repay_fraction(mut self, basis_points: u16) -> Self {
        self.repay_fraction_bps = basis_points;
        self
    }

    pub fn with_fixed_amount(mut self, amount: Option<U256>) -> Self {
        self.fixed_amount = amount;
        self
    }

    /// Amount repaid when the caller does not choose one.
    pub fn repay_amount(&self, debt: &DebtPosition) -> U256 {
        self.fixed_amount
            .unwrap_or_else(|| debt.portion(self.repay_fraction_bps))
    }

    /// Liquidate `account`, repaying `amount` (or the default repay amount)
    /// of `debt` and seizing `collateral`.
    #[instrument(skip(self, collateral, debt, amount))]
    pub async fn liquidate(
        &self,
        account: Address,
        collateral: &CollateralPosition,
        debt: &DebtPosition,
        amount: Option<U256>,
    ) -> Result<LiquidationResult, AgentError> {
        let amount = amount.unwrap_or_else(|| self.repay_amount(debt));
        if amount.is_zero() {
            warn!(account = %account, debt = %debt.amount, "Repay amount is zero, not liquidating");
            return Err(AgentError::ZeroRepayAmount { account });
        }

        info!(
            account = %account,
            collateral = %collateral.reserve,
            debt_reserve = %debt.reserve,
            debt = %debt.amount,
            amount = %amount,
            "Executing flash loan liquidation"
        );

        let start = Instant::now();
        let receipt = self
            .ledger
            .liquidate_user_with_flash_loan(account, collateral.reserve, debt.reserve, amount)
            .await
            .map_err(|source| AgentError::Execution { account, source })?;

        info!(
            account = %account,
            tx_hash = %receipt.tx_hash,
            block = ?receipt.block_number,
            gas_used = receipt.gas_used,
            elapsed_ms = start.elapsed().as_millis(),
            "Liquidation confirmed"
        );

        Ok(LiquidationResult {
            account,
            collateral_reserve: collateral.reserve,
            debt_reserve: debt.reserve,
            debt_covered: amount,
            tx_hash: receipt.tx_hash,
        })
    }
}

/// Result of a confirmed liquidation.
#[derive(Debug, Clone)]
pub struct LiquidationResult {
    pub account: Address,
    pub collateral_reserve: Address,
    pub debt_reserve: Address,
    pub debt_covered: U256,
    pub tx_hash: B256,
}
