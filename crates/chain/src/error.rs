//! Error types for ledger interaction.

use alloy::primitives::B256;
use std::fmt::Display;
use thiserror::Error;

/// Failure reported by a [`LendingLedger`](crate::LendingLedger) call.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A read against the ledger failed (RPC, transport, decoding).
    #[error("ledger query {method} failed: {reason}")]
    Query {
        method: &'static str,
        reason: String,
    },

    /// The liquidation transaction could not be submitted or confirmed.
    #[error("transaction submission failed: {reason}")]
    Submission { reason: String },

    /// The liquidation transaction was mined but reverted.
    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: B256 },
}

impl LedgerError {
    /// Wrap a read failure for `method`.
    pub fn query(method: &'static str, err: impl Display) -> Self {
        Self::Query {
            method,
            reason: err.to_string(),
        }
    }

    /// Wrap a send/confirm failure.
    pub fn submission(err: impl Display) -> Self {
        Self::Submission {
            reason: err.to_string(),
        }
    }

    /// Whether the failure came from a read rather than from the liquidation action.
    pub fn is_query(&self) -> bool {
        matches!(self, Self::Query { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_message() {
        let err = LedgerError::query("getReservesList", "connection refused");
        assert!(err.is_query());
        assert_eq!(
            err.to_string(),
            "ledger query getReservesList failed: connection refused"
        );
    }

    #[test]
    fn test_execution_errors_are_not_queries() {
        assert!(!LedgerError::submission("nonce too low").is_query());
        assert!(!LedgerError::Reverted { tx_hash: B256::ZERO }.is_query());
    }
}
