//! Eligibility scan over the watchlist.

use alloy::primitives::Address;
use futures::stream::{self, StreamExt};
use liquidator_chain::LendingLedger;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{AgentError, Stage};
use crate::watchlist::Watchlist;

/// Result of one pass over the watchlist.
#[derive(Debug, Default, Clone)]
pub struct EligibilityScan {
    /// Accounts ready for liquidation, in watchlist order
    pub eligible: Vec<Address>,
    /// Accounts whose eligibility could not be queried this pass
    pub query_failures: usize,
}

/// Queries `isUserReadyForLiquidation` for every watched account.
#[derive(Debug, Clone)]
pub struct EligibilityScanner {
    ledger: Arc<dyn LendingLedger>,
    concurrency: usize,
}

impl EligibilityScanner {
    pub fn new(ledger: Arc<dyn LendingLedger>, concurrency: usize) -> Self {
        Self {
            ledger,
            concurrency: concurrency.max(1),
        }
    }

    /// Query all accounts with bounded concurrency.
    ///
    /// A failed query counts the account as not eligible for this pass.
    pub async fn scan(&self, watchlist: &Watchlist) -> EligibilityScan {
        let results: Vec<(Address, Result<bool, AgentError>)> =
            stream::iter(watchlist.iter().copied())
                .map(|account| {
                    let ledger = Arc::clone(&self.ledger);
                    async move {
                        let ready = ledger
                            .is_user_ready_for_liquidation(account)
                            .await
                            .map_err(|e| AgentError::query(account, Stage::Scanning, e));
                        (account, ready)
                    }
                })
                .buffered(self.concurrency)
                .collect()
                .await;

        let mut scan = EligibilityScan::default();
        for (account, ready) in results {
            match ready {
                Ok(true) => scan.eligible.push(account),
                Ok(false) => {}
                Err(e) => {
                    warn!(account = %account, stage = %e.stage(), error = %e, "Eligibility query failed");
                    scan.query_failures += 1;
                }
            }
        }

        debug!(
            watched = watchlist.len(),
            eligible = scan.eligible.len(),
            failures = scan.query_failures,
            "Eligibility scan complete"
        );
        scan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockLedger;
    use std::time::Duration;

    fn accounts(n: u8) -> Vec<Address> {
        (1..=n).map(Address::with_last_byte).collect()
    }

    #[tokio::test]
    async fn test_filters_and_keeps_order() {
        let all = accounts(5);
        let ledger = MockLedger::new(vec![]);
        ledger.set_eligible(all[3], true);
        ledger.set_eligible(all[0], true);
        ledger.set_eligible(all[2], false);

        let scanner = EligibilityScanner::new(Arc::new(ledger), 2);
        let scan = scanner.scan(&Watchlist::new(all.clone())).await;

        assert_eq!(scan.eligible, vec![all[0], all[3]]);
        assert_eq!(scan.query_failures, 0);
    }

    #[tokio::test]
    async fn test_slow_answers_keep_watchlist_order() {
        let all = accounts(4);
        let ledger = MockLedger::new(vec![]);
        for account in &all {
            ledger.set_eligible(*account, true);
        }
        // Earlier accounts answer last
        ledger.set_eligibility_delay(all[0], Duration::from_millis(60));
        ledger.set_eligibility_delay(all[1], Duration::from_millis(30));

        let scanner = EligibilityScanner::new(Arc::new(ledger), 4);
        let scan = scanner.scan(&Watchlist::new(all.clone())).await;

        assert_eq!(scan.eligible, all);
    }

    #[tokio::test]
    async fn test_none_eligible() {
        let ledger = MockLedger::new(vec![]);
        let scanner = EligibilityScanner::new(Arc::new(ledger), 4);
        let scan = scanner.scan(&Watchlist::new(accounts(2))).await;
        assert!(scan.eligible.is_empty());
    }

    #[tokio::test]
    async fn test_failed_query_is_not_eligible() {
        let all = accounts(3);
        let ledger = MockLedger::new(vec![]);
        ledger.set_eligible(all[0], true);
        ledger.set_eligible(all[1], true);
        ledger.fail_eligibility(all[1]);

        let scanner = EligibilityScanner::new(Arc::new(ledger), 3);
        let scan = scanner.scan(&Watchlist::new(all.clone())).await;

        assert_eq!(scan.eligible, vec![all[0]]);
        assert_eq!(scan.query_failures, 1);
    }

    #[tokio::test]
    async fn test_empty_watchlist() {
        let ledger = Arc::new(MockLedger::new(vec![]));
        let scanner = EligibilityScanner::new(ledger.clone(), 4);
        let scan = scanner.scan(&Watchlist::new(Vec::new())).await;
        assert!(scan.eligible.is_empty());
        assert_eq!(ledger.eligibility_queries(), 0);
    }
}
