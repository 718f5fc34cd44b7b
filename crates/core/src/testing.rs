//! Scripted in-memory ledger for unit tests.

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use liquidator_chain::{LedgerError, LendingLedger, LiquidationReceipt, ReserveDebt};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// A liquidation the mock accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedLiquidation {
    pub account: Address,
    pub collateral: Address,
    pub debt: Address,
    pub amount: U256,
}

#[derive(Debug, Default)]
struct State {
    reserves: Vec<Address>,
    eligible: HashSet<Address>,
    failing_eligibility: HashSet<Address>,
    eligibility_delay: HashMap<Address, Duration>,
    debts: HashMap<(Address, Address), U256>,
    collateral: HashMap<Address, u64>,
    fail_reserves: bool,
    fail_debt: bool,
    fail_liquidations: bool,
    liquidation_delay: Option<Duration>,
    liquidations: Vec<RecordedLiquidation>,
}

#[derive(Debug, Default)]
pub struct MockLedger {
    state: Mutex<State>,
    eligibility_queries: AtomicUsize,
    debt_queries: AtomicUsize,
    collateral_queries: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockLedger {
    pub fn new(reserves: Vec<Address>) -> Self {
        let ledger = Self::default();
        ledger.state.lock().reserves = reserves;
        ledger
    }

    pub fn set_eligible(&self, account: Address, eligible: bool) {
        let mut state = self.state.lock();
        if eligible {
            state.eligible.insert(account);
        } else {
            state.eligible.remove(&account);
        }
    }

    /// Make eligibility answers for `account` arrive after `delay`.
    pub fn set_eligibility_delay(&self, account: Address, delay: Duration) {
        self.state.lock().eligibility_delay.insert(account, delay);
    }

    pub fn fail_eligibility(&self, account: Address) {
        self.state.lock().failing_eligibility.insert(account);
    }

    pub fn set_debt(&self, account: Address, reserve: Address, amount: U256) {
        self.state.lock().debts.insert((account, reserve), amount);
    }

    pub fn debt_of(&self, account: Address, reserve: Address) -> U256 {
        self.state
            .lock()
            .debts
            .get(&(account, reserve))
            .copied()
            .unwrap_or_default()
    }

    pub fn set_collateral_index(&self, account: Address, index: u64) {
        self.state.lock().collateral.insert(account, index);
    }

    pub fn fail_reserves(&self, fail: bool) {
        self.state.lock().fail_reserves = fail;
    }

    pub fn fail_debt_queries(&self, fail: bool) {
        self.state.lock().fail_debt = fail;
    }

    pub fn fail_liquidations(&self, fail: bool) {
        self.state.lock().fail_liquidations = fail;
    }

    pub fn set_liquidation_delay(&self, delay: Duration) {
        self.state.lock().liquidation_delay = Some(delay);
    }

    pub fn liquidations(&self) -> Vec<RecordedLiquidation> {
        self.state.lock().liquidations.clone()
    }

    pub fn eligibility_queries(&self) -> usize {
        self.eligibility_queries.load(Ordering::SeqCst)
    }

    pub fn debt_queries(&self) -> usize {
        self.debt_queries.load(Ordering::SeqCst)
    }

    pub fn collateral_queries(&self) -> usize {
        self.collateral_queries.load(Ordering::SeqCst)
    }

    /// Highest number of liquidations observed in flight at once.
    pub fn max_concurrent_liquidations(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LendingLedger for MockLedger {
    async fn get_reserves_list(&self) -> Result<Vec<Address>, LedgerError> {
        let state = self.state.lock();
        if state.fail_reserves {
            return Err(LedgerError::query("getReservesList", "mock failure"));
        }
        Ok(state.reserves.clone())
    }

    async fn is_user_ready_for_liquidation(&self, user: Address) -> Result<bool, LedgerError> {
        self.eligibility_queries.fetch_add(1, Ordering::SeqCst);
        let delay = self.state.lock().eligibility_delay.get(&user).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let state = self.state.lock();
        if state.failing_eligibility.contains(&user) {
            return Err(LedgerError::query("isUserReadyForLiquidation", "mock failure"));
        }
        Ok(state.eligible.contains(&user))
    }

    async fn get_user_debt_for_reserves(
        &self,
        user: Address,
        reserves: &[Address],
    ) -> Result<ReserveDebt, LedgerError> {
        self.debt_queries.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock();
        if state.fail_debt {
            return Err(LedgerError::query("getUserDebtForReserves", "mock failure"));
        }
        let found = reserves.iter().find_map(|reserve| {
            state
                .debts
                .get(&(user, *reserve))
                .filter(|amount| !amount.is_zero())
                .map(|amount| ReserveDebt::from_raw(*amount, *reserve))
        });
        Ok(found.unwrap_or(ReserveDebt::NONE))
    }

    async fn find_user_collateral_index(
        &self,
        user: Address,
        hard_limit: u64,
    ) -> Result<U256, LedgerError> {
        self.collateral_queries.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock();
        Ok(U256::from(
            state.collateral.get(&user).copied().unwrap_or(hard_limit),
        ))
    }

    async fn liquidate_user_with_flash_loan(
        &self,
        user: Address,
        collateral: Address,
        debt: Address,
        amount: U256,
    ) -> Result<LiquidationReceipt, LedgerError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self.state.lock().liquidation_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let result = {
            let mut state = self.state.lock();
            if state.fail_liquidations {
                Err(LedgerError::Reverted {
                    tx_hash: B256::repeat_byte(0xee),
                })
            } else {
                let owed = state.debts.entry((user, debt)).or_default();
                *owed = owed.saturating_sub(amount);
                state.liquidations.push(RecordedLiquidation {
                    account: user,
                    collateral,
                    debt,
                    amount,
                });
                let n = state.liquidations.len() as u8;
                Ok(LiquidationReceipt {
                    tx_hash: B256::with_last_byte(n),
                    block_number: Some(u64::from(n)),
                    gas_used: 1_500_000,
                })
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
