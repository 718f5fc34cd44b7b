//! Recurring scan → locate → execute cycle.
//!
//! Each tick scans the watchlist for liquidatable accounts, then works through
//! them one at a time under the [`LiquidationGuard`]: resolve collateral,
//! resolve debt, liquidate. Per-account failures are logged and never stop the
//! loop; the account is simply looked at again next tick.

use alloy::primitives::Address;
use liquidator_chain::LendingLedger;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::config::AgentConfig;
use crate::eligibility::EligibilityScanner;
use crate::error::{AgentError, Stage};
use crate::guard::{LiquidationCounter, LiquidationGuard};
use crate::liquidator::{LiquidationExecutor, LiquidationResult};
use crate::locator::ReserveLocator;
use crate::watchlist::Watchlist;

/// Where a tick currently is. Only used for logging transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Scanning,
    Locating,
    Executing,
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CycleState::Idle => "idle",
            CycleState::Scanning => "scanning",
            CycleState::Locating => "locating",
            CycleState::Executing => "executing",
        };
        f.write_str(name)
    }
}

/// Why an eligible account was not liquidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoCollateral,
    NoDebt,
    /// Eligible at scan time, no longer eligible once the guard was taken
    NoLongerEligible,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoCollateral => f.write_str("no collateral found"),
            SkipReason::NoDebt => f.write_str("no debt found"),
            SkipReason::NoLongerEligible => f.write_str("no longer eligible"),
        }
    }
}

/// Per-account counts for a tick that got past scanning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub eligible: usize,
    pub query_failures: usize,
    pub liquidated: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Accounts left for the next tick because the guard was taken
    pub deferred: usize,
}

/// What a tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// A liquidation was already in progress
    Skipped,
    NothingEligible,
    /// The reserve list could not be fetched
    Aborted,
    Processed(TickReport),
}

enum AccountOutcome {
    Liquidated(LiquidationResult),
    Skipped(SkipReason),
}

/// Drives the liquidation cycle.
#[derive(Debug)]
pub struct Scheduler {
    ledger: Arc<dyn LendingLedger>,
    watchlist: Watchlist,
    scanner: EligibilityScanner,
    locator: ReserveLocator,
    executor: LiquidationExecutor,
    guard: LiquidationGuard,
    counter: Arc<LiquidationCounter>,
    interval: Duration,
}

fn transition(state: &mut CycleState, next: CycleState) {
    debug!(from = %state, to = %next, "Cycle state");
    *state = next;
}

impl Scheduler {
    pub fn new(
        ledger: Arc<dyn LendingLedger>,
        watchlist: Watchlist,
        config: &AgentConfig,
        counter: Arc<LiquidationCounter>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            scanner: EligibilityScanner::new(
                Arc::clone(&ledger),
                config.scanner.eligibility_concurrency,
            ),
            locator: ReserveLocator::new(
                Arc::clone(&ledger),
                config.locator.reserve_check_rate,
                config.locator.reserve_hard_limit,
            ),
            executor: LiquidationExecutor::from_config(Arc::clone(&ledger), &config.liquidation)?,
            ledger,
            watchlist,
            guard: LiquidationGuard::new(),
            counter,
            interval: config.scanner.interval(),
        })
    }

    pub fn guard(&self) -> &LiquidationGuard {
        &self.guard
    }

    pub fn counter(&self) -> &LiquidationCounter {
        &self.counter
    }

    /// Run one cycle.
    ///
    /// Safe to call concurrently: at most one liquidation attempt runs at a time.
    ///
    /// Another tick can take the guard between two accounts of this one and
    /// liquidate them first, leaving this tick's scan stale. Eligibility is
    /// therefore checked again for each account once the guard is held.
    pub async fn tick(&self) -> TickOutcome {
        let mut state = CycleState::Idle;

        if self.guard.is_held() {
            debug!("Liquidation in progress, skipping tick");
            return TickOutcome::Skipped;
        }

        transition(&mut state, CycleState::Scanning);
        let scan = self.scanner.scan(&self.watchlist).await;
        if scan.eligible.is_empty() {
            info!("No account eligible for liquidation currently");
            transition(&mut state, CycleState::Idle);
            return TickOutcome::NothingEligible;
        }

        let reserves = match self.ledger.get_reserves_list().await {
            Ok(reserves) => reserves,
            Err(e) => {
                error!(error = %e, eligible = scan.eligible.len(), "Failed to fetch reserve list, aborting tick");
                transition(&mut state, CycleState::Idle);
                return TickOutcome::Aborted;
            }
        };

        let mut report = TickReport {
            eligible: scan.eligible.len(),
            query_failures: scan.query_failures,
            ..Default::default()
        };

        for (i, &account) in scan.eligible.iter().enumerate() {
            let Some(permit) = self.guard.try_acquire() else {
                report.deferred = scan.eligible.len() - i;
                warn!(deferred = report.deferred, "Liquidation in progress elsewhere, deferring remaining accounts");
                break;
            };

            match self.process_account(account, &reserves, &mut state).await {
                Ok(AccountOutcome::Liquidated(result)) => {
                    let total = self.counter.increment();
                    report.liquidated += 1;
                    info!(
                        account = %account,
                        tx_hash = %result.tx_hash,
                        debt_covered = %result.debt_covered,
                        total_liquidations = total,
                        "Account liquidated"
                    );
                }
                Ok(AccountOutcome::Skipped(reason)) => {
                    report.skipped += 1;
                    info!(account = %account, reason = %reason, "Skipping account");
                }
                Err(e) => {
                    report.failed += 1;
                    error!(account = %e.account(), stage = %e.stage(), error = %e, "Liquidation attempt failed");
                }
            }

            drop(permit);
            transition(&mut state, CycleState::Idle);
        }

        info!(
            eligible = report.eligible,
            liquidated = report.liquidated,
            skipped = report.skipped,
            failed = report.failed,
            deferred = report.deferred,
            total_liquidations = self.counter.get(),
            "Tick complete"
        );
        TickOutcome::Processed(report)
    }

    /// Locate and liquidate one account. Caller holds the guard.
    async fn process_account(
        &self,
        account: Address,
        reserves: &[Address],
        state: &mut CycleState,
    ) -> Result<AccountOutcome, AgentError> {
        let still_eligible = self
            .ledger
            .is_user_ready_for_liquidation(account)
            .await
            .map_err(|e| AgentError::query(account, Stage::Scanning, e))?;
        if !still_eligible {
            return Ok(AccountOutcome::Skipped(SkipReason::NoLongerEligible));
        }

        transition(state, CycleState::Locating);

        let collateral = self
            .locator
            .locate_collateral(account, reserves)
            .await
            .map_err(|e| AgentError::query(account, Stage::Collateral, e))?;
        let Some(collateral) = collateral else {
            return Ok(AccountOutcome::Skipped(SkipReason::NoCollateral));
        };

        let debt = self
            .locator
            .locate_debt(account, reserves)
            .await
            .map_err(|e| AgentError::query(account, Stage::Debt, e))?;
        let Some(debt) = debt else {
            return Ok(AccountOutcome::Skipped(SkipReason::NoDebt));
        };

        transition(state, CycleState::Executing);
        let result = self
            .executor
            .liquidate(account, &collateral, &debt, None)
            .await?;
        Ok(AccountOutcome::Liquidated(result))
    }

    /// Tick forever, pausing `interval` after each completed tick.
    pub async fn run(&self) {
        info!(
            accounts = self.watchlist.len(),
            interval_ms = self.interval.as_millis() as u64,
            "Starting liquidation loop"
        );

        let mut n: u64 = 0;
        loop {
            n += 1;
            self.tick().instrument(info_span!("tick", n)).await;
            tokio::time::sleep(self.interval).await;
        }
    }
}
