//! In-memory ledger repository.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

use comptoir_shared::types::LedgerRowId;

use super::error::LedgerError;
use super::repository::{AccountCommit, LedgerRepository};
use super::types::{LedgerAccount, LedgerRow};

#[derive(Debug, Default)]
struct State {
    rows: HashMap<LedgerRowId, LedgerRow>,
    by_account: HashMap<LedgerAccount, HashSet<LedgerRowId>>,
}

impl State {
    fn put(&mut self, row: LedgerRow) {
        self.by_account
            .entry(row.account.clone())
            .or_default()
            .insert(row.id);
        self.rows.insert(row.id, row);
    }

    fn take(&mut self, id: LedgerRowId) -> Option<LedgerRow> {
        let row = self.rows.remove(&id)?;
        if let Some(ids) = self.by_account.get_mut(&row.account) {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_account.remove(&row.account);
            }
        }
        Some(row)
    }
}

/// Ledger repository keeping rows in process memory.
///
/// A commit is applied under a single write lock after every referenced row
/// has been checked, so it is all-or-nothing.
#[derive(Debug, Default)]
pub struct InMemoryLedgerRepository {
    state: RwLock<State>,
    sequence: AtomicI64,
}

impl InMemoryLedgerRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a row exactly as given, bypassing the engine.
    ///
    /// Used to load legacy data whose balances have not been recomputed yet.
    pub fn seed(&self, row: LedgerRow) -> Result<(), LedgerError> {
        self.sequence.fetch_max(row.sequence_id, Ordering::SeqCst);
        self.write()?.put(row);
        Ok(())
    }

    /// Number of stored rows.
    pub fn len(&self) -> Result<usize, LedgerError> {
        Ok(self.read()?.rows.len())
    }

    /// Returns true if no rows are stored.
    pub fn is_empty(&self) -> Result<bool, LedgerError> {
        Ok(self.read()?.rows.is_empty())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, State>, LedgerError> {
        self.state
            .read()
            .map_err(|_| LedgerError::Internal("ledger store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, State>, LedgerError> {
        self.state
            .write()
            .map_err(|_| LedgerError::Internal("ledger store lock poisoned".to_string()))
    }
}

impl LedgerRepository for InMemoryLedgerRepository {
    async fn next_sequence(&self) -> Result<i64, LedgerError> {
        Ok(self.sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn find_row(&self, id: LedgerRowId) -> Result<Option<LedgerRow>, LedgerError> {
        Ok(self.read()?.rows.get(&id).cloned())
    }

    async fn load_account(&self, account: &LedgerAccount) -> Result<Vec<LedgerRow>, LedgerError> {
        let state = self.read()?;
        let rows = state
            .by_account
            .get(account)
            .map(|ids| ids.iter().filter_map(|id| state.rows.get(id).cloned()).collect())
            .unwrap_or_default();
        Ok(rows)
    }

    async fn commit(
        &self,
        account: &LedgerAccount,
        commit: AccountCommit,
    ) -> Result<(), LedgerError> {
        let mut state = self.write()?;

        if let Some(row) = &commit.upsert {
            if &row.account != account {
                return Err(LedgerError::Internal(format!(
                    "row {} does not belong to {account}",
                    row.id
                )));
            }
        }
        if let Some(id) = commit.delete {
            if !state.rows.contains_key(&id) {
                return Err(LedgerError::RowNotFound(id));
            }
        }
        for change in &commit.balances {
            let known = state.rows.get(&change.row_id).is_some_and(|r| &r.account == account)
                || commit.upsert.as_ref().is_some_and(|r| r.id == change.row_id);
            if !known {
                return Err(LedgerError::RowNotFound(change.row_id));
            }
        }

        if let Some(id) = commit.delete {
            state.take(id);
        }
        if let Some(row) = commit.upsert {
            state.take(row.id);
            state.put(row);
        }
        for change in commit.balances {
            if let Some(row) = state.rows.get_mut(&change.row_id) {
                row.balance = change.current;
            }
        }

        Ok(())
    }

    async fn list_accounts(&self) -> Result<Vec<LedgerAccount>, LedgerError> {
        Ok(self.read()?.by_account.keys().cloned().collect())
    }
}
