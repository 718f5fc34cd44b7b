//! Fixed, ordered set of monitored accounts.

use alloy::primitives::Address;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

use crate::config::WatchlistConfig;

/// Accounts evaluated every cycle, in configuration order.
///
/// Immutable once built; clones share the same backing slice.
#[derive(Debug, Clone)]
pub struct Watchlist {
    accounts: Arc<[Address]>,
}

impl Watchlist {
    /// Build from addresses, keeping the first occurrence of duplicates.
    pub fn new(accounts: impl IntoIterator<Item = Address>) -> Self {
        let mut seen = HashSet::new();
        let mut ordered = Vec::new();
        for account in accounts {
            if seen.insert(account) {
                ordered.push(account);
            } else {
                warn!(account = %account, "Duplicate watchlist entry ignored");
            }
        }
        Self {
            accounts: ordered.into(),
        }
    }

    pub fn from_config(config: &WatchlistConfig) -> Result<Self> {
        let accounts = config
            .accounts
            .iter()
            .map(|s| {
                s.trim()
                    .parse::<Address>()
                    .with_context(|| format!("Invalid watchlist account '{}'", s))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(accounts))
    }

    pub fn accounts(&self) -> &[Address] {
        &self.accounts
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.accounts.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserves_order_and_dedups() {
        let a = Address::repeat_byte(1);
        let b = Address::repeat_byte(2);
        let list = Watchlist::new([b, a, b]);
        assert_eq!(list.accounts(), &[b, a]);
    }

    #[test]
    fn test_from_config() {
        let config = WatchlistConfig {
            accounts: vec![
                "0x0000000000000000000000000000000000000001".to_string(),
                " 0x0000000000000000000000000000000000000002 ".to_string(),
            ],
        };
        let list = Watchlist::from_config(&config).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.accounts()[1], Address::with_last_byte(2));
    }

    #[test]
    fn test_from_config_rejects_garbage() {
        let config = WatchlistConfig {
            accounts: vec!["not-an-address".to_string()],
        };
        assert!(Watchlist::from_config(&config).is_err());
    }

    #[test]
    fn test_clones_share_storage() {
        let list = Watchlist::new([Address::repeat_byte(9)]);
        let other = list.clone();
        assert!(std::ptr::eq(list.accounts(), other.accounts()));
    }
}
