//! Per-cycle position data resolved for an eligible account.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::u256_math;

/// Collateral reserve resolved through the ledger's direct index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralPosition {
    /// Reserve asset address
    pub reserve: Address,
    /// Position of the reserve in the ledger's reserve list
    pub index: u64,
}

/// First reserve (in ledger order) on which the account has debt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtPosition {
    /// Reserve asset address
    pub reserve: Address,
    /// Raw debt amount (token decimals)
    pub amount: U256,
}

impl DebtPosition {
    /// Basis-point share of the debt, rounded down.
    #[inline]
    pub fn portion(&self, basis_points: u16) -> U256 {
        u256_math::portion_bps(self.amount, basis_points)
    }
}
