//! Per-account failures raised inside a liquidation cycle.

use alloy::primitives::Address;
use liquidator_chain::LedgerError;
use std::fmt;
use thiserror::Error;

/// Step of the cycle an account was in when something went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Scanning,
    Collateral,
    Debt,
    Executing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Scanning => "scanning",
            Stage::Collateral => "collateral",
            Stage::Debt => "debt",
            Stage::Executing => "executing",
        };
        f.write_str(name)
    }
}

/// Errors surfaced for a single account. None of these stop the agent.
#[derive(Debug, Error)]
pub enum AgentError {
    /// A ledger read failed; the account is retried next cycle.
    #[error("query failed for {account} while {stage}: {source}")]
    Query {
        account: Address,
        stage: Stage,
        #[source]
        source: LedgerError,
    },

    /// The liquidation was not submitted or reverted.
    #[error("liquidation of {account} failed: {source}")]
    Execution {
        account: Address,
        #[source]
        source: LedgerError,
    },

    #[error("refusing to liquidate {account} with a zero repay amount")]
    ZeroRepayAmount { account: Address },
}

impl AgentError {
    pub fn query(account: Address, stage: Stage, source: LedgerError) -> Self {
        Self::Query {
            account,
            stage,
            source,
        }
    }

    pub fn account(&self) -> Address {
        match self {
            Self::Query { account, .. }
            | Self::Execution { account, .. }
            | Self::ZeroRepayAmount { account } => *account,
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Self::Query { stage, .. } => *stage,
            Self::Execution { .. } | Self::ZeroRepayAmount { .. } => Stage::Executing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_and_display() {
        let account = Address::repeat_byte(7);
        let err = AgentError::query(
            account,
            Stage::Debt,
            LedgerError::query("getUserDebtForReserves", "timeout"),
        );
        assert_eq!(err.stage(), Stage::Debt);
        assert_eq!(err.account(), account);
        assert!(err.to_string().contains("while debt"));

        let err = AgentError::ZeroRepayAmount { account };
        assert_eq!(err.stage(), Stage::Executing);
    }
}
