//! Ledger service: mutations with cascade recompute.
//!
//! Every mutation runs the same critical section for its account:
//! acquire the account lock, load the rows into an [`AccountBook`], apply the
//! change, recompute every balance of the account from zero, validate the
//! result and commit every write in one repository call. Stored balances are
//! never trusted as a starting point, since rows written before cascading
//! existed may be stale. Nothing is written unless all of that succeeds.

use std::sync::Arc;

use comptoir_shared::LedgerConfig;
use comptoir_shared::types::LedgerRowId;
use tracing::{debug, info, instrument, warn};

use super::balance::AccountSummary;
use super::book::AccountBook;
use super::error::LedgerError;
use super::locks::AccountLocks;
use super::repository::{AccountCommit, LedgerRepository};
use super::types::{BalanceChange, LedgerAccount, LedgerRow, LedgerRowPatch, NewLedgerRow};
use super::validation;

/// Outcome of recomputing every account.
#[derive(Debug, Default)]
pub struct RebalanceReport {
    /// Accounts recomputed successfully.
    pub accounts: usize,
    /// Balances rewritten across all accounts.
    pub rows_changed: usize,
    /// Accounts that could not be recomputed.
    pub failures: Vec<(LedgerAccount, LedgerError)>,
}

/// Running-ledger engine over a repository.
pub struct LedgerService<R: LedgerRepository> {
    repo: Arc<R>,
    locks: AccountLocks,
    config: LedgerConfig,
}

impl<R: LedgerRepository> LedgerService<R> {
    /// Creates a new ledger service.
    #[must_use]
    pub fn new(repo: Arc<R>, config: LedgerConfig) -> Self {
        Self {
            repo,
            locks: AccountLocks::new(),
            config,
        }
    }

    /// Returns the underlying repository.
    #[must_use]
    pub fn repository(&self) -> &Arc<R> {
        &self.repo
    }

    /// Inserts a row and recomputes the account.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input or a negative stock count,
    /// `ResourceExhausted` if the account is full and `ConcurrencyConflict`
    /// if the account lock cannot be taken in time.
    #[instrument(skip(self, input), fields(account = %input.account))]
    pub async fn insert_row(&self, input: NewLedgerRow) -> Result<LedgerRowId, LedgerError> {
        validation::validate_new_row(&input)?;

        let account = input.account.clone();
        let _guard = self.locks.acquire(&account, self.config.lock_timeout()).await?;

        let mut book = self.load_book(&account).await?;
        validation::validate_row_limit(&account, book.len() + 1, self.config.max_rows_per_account)?;

        let id = LedgerRowId::new();
        let sequence_id = self.repo.next_sequence().await?;
        book.insert(LedgerRow::from_input(id, input, sequence_id));

        let commit = Self::cascade(&mut book, Some(id), None)?;
        self.repo.commit(&account, commit).await?;

        debug!(row_id = %id, sequence_id, "ledger row inserted");
        Ok(id)
    }

    /// Updates a row, possibly moving it, and recomputes the account.
    ///
    /// # Errors
    ///
    /// Returns `RowNotFound` if the row does not exist, plus the errors of
    /// [`Self::insert_row`].
    #[instrument(skip(self, patch))]
    pub async fn update_row(&self, id: LedgerRowId, patch: LedgerRowPatch) -> Result<(), LedgerError> {
        validation::validate_patch(&patch)?;

        let account = self
            .repo
            .find_row(id)
            .await?
            .ok_or(LedgerError::RowNotFound(id))?
            .account;
        let _guard = self.locks.acquire(&account, self.config.lock_timeout()).await?;

        // re-read under the lock: the row may have moved or vanished meanwhile
        let mut book = self.load_book(&account).await?;
        let current = book.get(id).ok_or(LedgerError::RowNotFound(id))?;
        if patch.is_empty() {
            return Ok(());
        }

        let updated = patch.apply(current);
        validation::validate_row(&updated)?;
        book.replace(updated).ok_or(LedgerError::RowNotFound(id))?;

        let commit = Self::cascade(&mut book, Some(id), None)?;
        self.repo.commit(&account, commit).await?;

        debug!(%account, "ledger row updated");
        Ok(())
    }

    /// Deletes a row and recomputes the account.
    ///
    /// # Errors
    ///
    /// Returns `RowNotFound` if the row does not exist, `InsufficientStock` if
    /// removing a stock entry leaves a later count negative.
    #[instrument(skip(self))]
    pub async fn delete_row(&self, id: LedgerRowId) -> Result<(), LedgerError> {
        let account = self
            .repo
            .find_row(id)
            .await?
            .ok_or(LedgerError::RowNotFound(id))?
            .account;
        let _guard = self.locks.acquire(&account, self.config.lock_timeout()).await?;

        let mut book = self.load_book(&account).await?;
        book.remove(id).ok_or(LedgerError::RowNotFound(id))?;

        let commit = Self::cascade(&mut book, None, Some(id))?;
        self.repo.commit(&account, commit).await?;

        debug!(%account, "ledger row deleted");
        Ok(())
    }

    /// Recomputes every balance of an account from scratch.
    ///
    /// Returns the balances that changed; an immediate second call returns
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account has no rows.
    #[instrument(skip(self), fields(account = %account))]
    pub async fn recompute(&self, account: &LedgerAccount) -> Result<Vec<BalanceChange>, LedgerError> {
        let _guard = self.locks.acquire(account, self.config.lock_timeout()).await?;

        let mut book = self.load_book(account).await?;
        if book.is_empty() {
            return Err(LedgerError::AccountNotFound(account.clone()));
        }

        let changes = book.recompute_all()?;
        if !changes.is_empty() {
            let commit = AccountCommit {
                balances: changes.clone(),
                ..AccountCommit::default()
            };
            self.repo.commit(account, commit).await?;
            info!(changed = changes.len(), "account balances recomputed");
        }

        Ok(changes)
    }

    /// Recomputes every account known to the repository.
    ///
    /// Per-account failures are collected rather than aborting the run.
    ///
    /// # Errors
    ///
    /// Returns an error only if the account list cannot be read.
    pub async fn recompute_all(&self) -> Result<RebalanceReport, LedgerError> {
        let mut report = RebalanceReport::default();

        for account in self.repo.list_accounts().await? {
            match self.recompute(&account).await {
                Ok(changes) => {
                    report.accounts += 1;
                    report.rows_changed += changes.len();
                }
                Err(err) => {
                    warn!(%account, error = %err, "account recompute failed");
                    report.failures.push((account, err));
                }
            }
        }
        self.locks.prune_idle();

        Ok(report)
    }

    /// Fetches one row with its committed balance.
    ///
    /// # Errors
    ///
    /// Returns `RowNotFound` if the row does not exist.
    pub async fn get_row(&self, id: LedgerRowId) -> Result<LedgerRow, LedgerError> {
        self.repo.find_row(id).await?.ok_or(LedgerError::RowNotFound(id))
    }

    /// Lists an account's rows in ledger order.
    pub async fn list_rows(&self, account: &LedgerAccount) -> Result<Vec<LedgerRow>, LedgerError> {
        let book = self.load_book(account).await?;
        Ok(book.rows().cloned().collect())
    }

    /// Summarises an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account has no rows.
    pub async fn summary(&self, account: &LedgerAccount) -> Result<AccountSummary, LedgerError> {
        let book = self.load_book(account).await?;
        if book.is_empty() {
            return Err(LedgerError::AccountNotFound(account.clone()));
        }
        AccountSummary::from_book(&book)
    }

    async fn load_book(&self, account: &LedgerAccount) -> Result<AccountBook, LedgerError> {
        let rows = self.repo.load_account(account).await?;
        validation::validate_row_limit(account, rows.len(), self.config.max_rows_per_account)?;
        AccountBook::from_rows(account.clone(), rows)
    }

    /// Recomputes the whole account, validates the new chain and packages
    /// the writes.
    fn cascade(
        book: &mut AccountBook,
        touched: Option<LedgerRowId>,
        deleted: Option<LedgerRowId>,
    ) -> Result<AccountCommit, LedgerError> {
        let mut balances = book.recompute_all()?;
        validation::validate_stock_chain(book)?;

        let upsert = match touched {
            Some(id) => {
                balances.retain(|change| change.row_id != id);
                Some(
                    book.get(id)
                        .cloned()
                        .ok_or_else(|| LedgerError::Internal(format!("row {id} vanished from book")))?,
                )
            }
            None => None,
        };
        debug!(cascaded = balances.len(), "balances cascaded");

        Ok(AccountCommit {
            upsert,
            delete: deleted,
            balances,
        })
    }
}
