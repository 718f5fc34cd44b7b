//! Ledger abstraction consumed by the liquidation loop.
//!
//! The loop only ever talks to the lending protocol through this trait:
//! four reads and one atomic action. [`LiquidatorAgent`](crate::LiquidatorAgent)
//! implements it against a deployed agent contract; tests substitute an
//! in-memory ledger.

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::LedgerError;

/// Debt lookup result for one window of reserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReserveDebt {
    /// Outstanding debt on `reserve` (zero when nothing was found)
    pub amount: U256,
    /// First reserve in the window with non-zero debt
    pub reserve: Option<Address>,
}

impl ReserveDebt {
    /// No debt in the queried window.
    pub const NONE: Self = Self {
        amount: U256::ZERO,
        reserve: None,
    };

    /// Build from the raw contract return, where the zero address means "none".
    pub fn from_raw(amount: U256, reserve: Address) -> Self {
        if reserve == Address::ZERO {
            Self {
                amount,
                reserve: None,
            }
        } else {
            Self {
                amount,
                reserve: Some(reserve),
            }
        }
    }
}

/// Confirmation of a landed liquidation.
#[derive(Debug, Clone)]
pub struct LiquidationReceipt {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

/// Query/action interface of the lending ledger.
#[async_trait]
pub trait LendingLedger: Send + Sync + Debug {
    /// Ordered list of all reserves in the lending pool.
    async fn get_reserves_list(&self) -> Result<Vec<Address>, LedgerError>;

    /// Whether `user` currently satisfies the liquidation predicate.
    async fn is_user_ready_for_liquidation(&self, user: Address) -> Result<bool, LedgerError>;

    /// Debt of `user` across `reserves`: the first reserve (in slice order)
    /// with non-zero debt, or [`ReserveDebt::NONE`].
    async fn get_user_debt_for_reserves(
        &self,
        user: Address,
        reserves: &[Address],
    ) -> Result<ReserveDebt, LedgerError>;

    /// Index into the reserve list of `user`'s collateral. Any value
    /// `>= hard_limit` means no collateral was found.
    async fn find_user_collateral_index(
        &self,
        user: Address,
        hard_limit: u64,
    ) -> Result<U256, LedgerError>;

    /// Borrow `amount` of `debt`, repay `user`'s debt, seize `collateral`,
    /// swap it back and repay the flash loan. Atomic: either a receipt or an error.
    async fn liquidate_user_with_flash_loan(
        &self,
        user: Address,
        collateral: Address,
        debt: Address,
        amount: U256,
    ) -> Result<LiquidationReceipt, LedgerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_address_means_no_reserve() {
        let debt = ReserveDebt::from_raw(U256::ZERO, Address::ZERO);
        assert_eq!(debt, ReserveDebt::NONE);
    }

    #[test]
    fn test_reserve_debt_keeps_reserve() {
        let reserve = Address::repeat_byte(0x11);
        let debt = ReserveDebt::from_raw(U256::from(42u64), reserve);
        assert_eq!(debt.reserve, Some(reserve));
        assert_eq!(debt.amount, U256::from(42u64));
    }
}
