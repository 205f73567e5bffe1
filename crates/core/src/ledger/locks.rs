//! Per-account critical sections.
//!
//! One async mutex per account serialises the load, recompute and commit of
//! that account. Different accounts never contend. An entry lives in the
//! registry only while someone holds or waits on it.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::warn;

use super::error::LedgerError;
use super::types::LedgerAccount;

type LockMap = DashMap<LedgerAccount, Arc<Mutex<()>>>;

/// Lock registry keyed by account.
#[derive(Debug, Default)]
pub struct AccountLocks {
    locks: LockMap,
}

/// Exclusive access to one account.
///
/// Dropping the guard unlocks the account and removes its registry entry
/// when nobody else is waiting on it.
#[derive(Debug)]
pub struct AccountGuard<'a> {
    locks: &'a LockMap,
    account: LedgerAccount,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for AccountGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // the map holds the only remaining reference once every waiter is gone
        self.locks
            .remove_if(&self.account, |_, lock| Arc::strong_count(lock) == 1);
    }
}

impl AccountLocks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits up to `timeout` for exclusive access to `account`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::ConcurrencyConflict` when the wait expires.
    pub async fn acquire(
        &self,
        account: &LedgerAccount,
        timeout: Duration,
    ) -> Result<AccountGuard<'_>, LedgerError> {
        // clone the Arc out so no map shard is held across the await
        let lock = Arc::clone(self.locks.entry(account.clone()).or_default().value());

        match tokio::time::timeout(timeout, lock.lock_owned()).await {
            Ok(guard) => Ok(AccountGuard {
                locks: &self.locks,
                account: account.clone(),
                guard: Some(guard),
            }),
            Err(_) => {
                warn!(%account, timeout_ms = timeout.as_millis(), "timed out waiting for account lock");
                Err(LedgerError::ConcurrencyConflict(account.clone()))
            }
        }
    }

    /// Drops locks nobody is holding or waiting on, such as entries left by
    /// cancelled waits.
    pub fn prune_idle(&self) {
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    /// Number of tracked accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Returns true if no account lock is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
