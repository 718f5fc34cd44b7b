//! Single-flight liquidation guard and the completed-liquidation counter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Allows at most one liquidation attempt at a time.
///
/// Acquisition never waits: a caller that finds the guard held gives up.
/// Clones share the same lock.
#[derive(Debug, Clone, Default)]
pub struct LiquidationGuard {
    lock: Arc<Mutex<()>>,
}

/// Proof that the holder owns the guard. Dropping it releases the guard.
#[derive(Debug)]
pub struct GuardPermit {
    _permit: OwnedMutexGuard<()>,
}

impl LiquidationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Option<GuardPermit> {
        Arc::clone(&self.lock)
            .try_lock_owned()
            .ok()
            .map(|permit| GuardPermit { _permit: permit })
    }

    pub fn is_held(&self) -> bool {
        self.lock.try_lock().is_err()
    }
}

/// Number of confirmed liquidations since startup. Only ever goes up.
#[derive(Debug, Default)]
pub struct LiquidationCounter {
    count: AtomicU64,
}

impl LiquidationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one confirmed liquidation and return the new total.
    pub fn increment(&self) -> u64 {
        self.count.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn get(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_refused() {
        let guard = LiquidationGuard::new();
        let permit = guard.try_acquire().unwrap();
        assert!(guard.is_held());
        assert!(guard.try_acquire().is_none());
        assert!(guard.clone().try_acquire().is_none());

        drop(permit);
        assert!(!guard.is_held());
        assert!(guard.try_acquire().is_some());
    }

    #[tokio::test]
    async fn test_permit_released_across_tasks() {
        let guard = LiquidationGuard::new();
        let permit = guard.try_acquire().unwrap();

        let handle = tokio::spawn(async move {
            tokio::task::yield_now().await;
            drop(permit);
        });
        handle.await.unwrap();

        assert!(guard.try_acquire().is_some());
    }

    #[test]
    fn test_counter() {
        let counter = LiquidationCounter::new();
        assert_eq!(counter.get(), 0);
        assert_eq!(counter.increment(), 1);
        assert_eq!(counter.increment(), 2);
        assert_eq!(counter.get(), 2);
    }
}
