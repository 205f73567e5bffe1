//! Per-account ordered index of ledger rows.
//!
//! An [`AccountBook`] keeps one account's rows keyed by [`OrderKey`], so rows
//! stay in ledger order as they are inserted, moved and removed, and the
//! predecessor of any position is a range lookup.

use std::collections::{BTreeMap, HashMap};

use comptoir_shared::types::LedgerRowId;
use rust_decimal::Decimal;

use super::balance::carry;
use super::error::LedgerError;
use super::ordering::OrderKey;
use super::types::{BalanceChange, LedgerAccount, LedgerRow};

/// Ordered rows of a single account.
#[derive(Debug, Clone)]
pub struct AccountBook {
    account: LedgerAccount,
    rows: BTreeMap<OrderKey, LedgerRow>,
    keys: HashMap<LedgerRowId, OrderKey>,
}

impl AccountBook {
    /// Creates an empty book.
    #[must_use]
    pub fn new(account: LedgerAccount) -> Self {
        Self {
            account,
            rows: BTreeMap::new(),
            keys: HashMap::new(),
        }
    }

    /// Builds a book from stored rows.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Internal` if a row belongs to another account or
    /// two rows share an ordering key.
    pub fn from_rows(
        account: LedgerAccount,
        rows: impl IntoIterator<Item = LedgerRow>,
    ) -> Result<Self, LedgerError> {
        let mut book = Self::new(account);
        for row in rows {
            if row.account != book.account {
                return Err(LedgerError::Internal(format!(
                    "row {} belongs to {} but was loaded for {}",
                    row.id, row.account, book.account
                )));
            }
            let key = row.order_key();
            if book.rows.contains_key(&key) {
                return Err(LedgerError::Internal(format!(
                    "duplicate sequence {} in account {}",
                    row.sequence_id, book.account
                )));
            }
            book.insert(row);
        }
        Ok(book)
    }

    /// Returns the account this book tracks.
    #[must_use]
    pub const fn account(&self) -> &LedgerAccount {
        &self.account
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the book holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Looks up a row by id.
    #[must_use]
    pub fn get(&self, id: LedgerRowId) -> Option<&LedgerRow> {
        self.keys.get(&id).and_then(|key| self.rows.get(key))
    }

    /// Iterates rows in ledger order.
    pub fn rows(&self) -> impl Iterator<Item = &LedgerRow> {
        self.rows.values()
    }

    /// Iterates rows at or after `start`, in ledger order.
    pub fn rows_from(&self, start: &OrderKey) -> impl Iterator<Item = &LedgerRow> {
        self.rows.range(start..).map(|(_, row)| row)
    }

    /// Key of the first row, if any.
    #[must_use]
    pub fn first_key(&self) -> Option<OrderKey> {
        self.rows.keys().next().copied()
    }

    /// Closing balance of the account (balance of the last row).
    #[must_use]
    pub fn closing_balance(&self) -> Decimal {
        self.rows
            .values()
            .next_back()
            .map_or(Decimal::ZERO, |row| row.balance)
    }

    /// Balance carried into `key`: the balance of the row strictly before it,
    /// or zero at the start of the account.
    #[must_use]
    pub fn balance_before(&self, key: &OrderKey) -> Decimal {
        self.rows
            .range(..key)
            .next_back()
            .map_or(Decimal::ZERO, |(_, row)| row.balance)
    }

    /// Inserts a row and returns its key, the first position affected.
    pub fn insert(&mut self, row: LedgerRow) -> OrderKey {
        let key = row.order_key();
        if let Some(previous) = self.keys.insert(row.id, key) {
            self.rows.remove(&previous);
        }
        self.rows.insert(key, row);
        key
    }

    /// Removes a row and returns it.
    pub fn remove(&mut self, id: LedgerRowId) -> Option<LedgerRow> {
        let key = self.keys.remove(&id)?;
        self.rows.remove(&key)
    }

    /// Replaces an existing row, possibly moving it, and returns the first
    /// affected position: the earlier of its old and new keys.
    ///
    /// Returns `None` if the row is not in the book.
    pub fn replace(&mut self, row: LedgerRow) -> Option<OrderKey> {
        let old_key = *self.keys.get(&row.id)?;
        let new_key = self.insert(row);
        Some(old_key.min(new_key))
    }

    /// Recomputes balances from `start` to the end of the account.
    ///
    /// The running total is seeded with the stored balance of the row before
    /// `start`, so the result equals a full recompute only when that prefix
    /// is already correct. Only rows whose balance actually changed are
    /// reported.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AmountOverflow` if a balance is out of range.
    /// Rows before the overflowing one keep their new balances.
    pub fn cascade_from(&mut self, start: &OrderKey) -> Result<Vec<BalanceChange>, LedgerError> {
        let mut running = self.balance_before(start);
        let mut changes = Vec::new();

        for row in self.rows.range_mut(start..).map(|(_, row)| row) {
            running = carry(running, row.delta()?)?;
            if row.balance != running {
                changes.push(BalanceChange {
                    row_id: row.id,
                    previous: row.balance,
                    current: running,
                });
                row.balance = running;
            }
        }

        Ok(changes)
    }

    /// Recomputes every balance from zero at the first row, ignoring every
    /// stored balance.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AmountOverflow` if a balance is out of range.
    pub fn recompute_all(&mut self) -> Result<Vec<BalanceChange>, LedgerError> {
        match self.first_key() {
            Some(start) => self.cascade_from(&start),
            None => Ok(Vec::new()),
        }
    }

    /// Returns the first row at or after `start` whose balance is negative.
    #[must_use]
    pub fn first_negative_from(&self, start: &OrderKey) -> Option<&LedgerRow> {
        self.rows_from(start).find(|row| row.balance < Decimal::ZERO)
    }
}
