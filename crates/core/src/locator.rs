//! Collateral and debt reserve lookup for a single account.

use alloy::primitives::{Address, U256};
use liquidator_chain::{LedgerError, LendingLedger};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::position::{CollateralPosition, DebtPosition};

/// Resolves which reserves an account's collateral and debt sit on.
///
/// Exhausted lookups return `Ok(None)`; only ledger failures are errors.
#[derive(Debug, Clone)]
pub struct ReserveLocator {
    ledger: Arc<dyn LendingLedger>,
    /// Reserves per debt query
    window: usize,
    /// Exclusive upper bound for collateral indices
    hard_limit: u64,
}

impl ReserveLocator {
    pub fn new(ledger: Arc<dyn LendingLedger>, window: usize, hard_limit: u64) -> Self {
        Self {
            ledger,
            window: window.max(1),
            hard_limit,
        }
    }

    /// First reserve with non-zero debt, scanning `reserves` window by window.
    pub async fn locate_debt(
        &self,
        account: Address,
        reserves: &[Address],
    ) -> Result<Option<DebtPosition>, LedgerError> {
        for (i, window) in reserves.chunks(self.window).enumerate() {
            let debt = self
                .ledger
                .get_user_debt_for_reserves(account, window)
                .await?;

            if let Some(reserve) = debt.reserve {
                debug!(
                    account = %account,
                    reserve = %reserve,
                    amount = %debt.amount,
                    window = i,
                    "Debt located"
                );
                return Ok(Some(DebtPosition {
                    reserve,
                    amount: debt.amount,
                }));
            }
        }

        debug!(account = %account, reserves = reserves.len(), "No debt found");
        Ok(None)
    }

    /// Collateral reserve via the ledger's direct index.
    pub async fn locate_collateral(
        &self,
        account: Address,
        reserves: &[Address],
    ) -> Result<Option<CollateralPosition>, LedgerError> {
        if reserves.is_empty() {
            return Ok(None);
        }

        let index = self
            .ledger
            .find_user_collateral_index(account, self.hard_limit)
            .await?;

        if index >= U256::from(self.hard_limit) {
            debug!(account = %account, hard_limit = self.hard_limit, "No collateral found");
            return Ok(None);
        }

        let index = index.saturating_to::<u64>();
        match usize::try_from(index).ok().and_then(|i| reserves.get(i)) {
            Some(&reserve) => {
                debug!(account = %account, reserve = %reserve, index, "Collateral located");
                Ok(Some(CollateralPosition { reserve, index }))
            }
            None => {
                warn!(
                    account = %account,
                    index,
                    reserves = reserves.len(),
                    "Collateral index outside the reserve list"
                );
                Ok(None)
            }
        }
    }
}
