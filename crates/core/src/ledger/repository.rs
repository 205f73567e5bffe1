//! Persistence seam for the ledger engine.

use comptoir_shared::types::LedgerRowId;

use super::error::LedgerError;
use super::types::{BalanceChange, LedgerAccount, LedgerRow};

/// Every write produced by one mutation of one account.
///
/// Implementations must apply all of it or none of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountCommit {
    /// Row to insert or overwrite, carrying its recomputed balance.
    pub upsert: Option<LedgerRow>,
    /// Row to delete.
    pub delete: Option<LedgerRowId>,
    /// Balances of other rows rewritten by the cascade.
    pub balances: Vec<BalanceChange>,
}

impl AccountCommit {
    /// Returns true if the commit writes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.upsert.is_none() && self.delete.is_none() && self.balances.is_empty()
    }
}

/// Repository trait for ledger row persistence.
///
/// This trait is implemented by the db crate to provide actual database
/// operations; [`super::memory::InMemoryLedgerRepository`] backs tests and
/// embedded use.
pub trait LedgerRepository: Send + Sync {
    /// Allocate the next insertion sequence number.
    fn next_sequence(&self)
    -> impl std::future::Future<Output = Result<i64, LedgerError>> + Send;

    /// Find a row by ID.
    fn find_row(
        &self,
        id: LedgerRowId,
    ) -> impl std::future::Future<Output = Result<Option<LedgerRow>, LedgerError>> + Send;

    /// Load every row of one account, in any order.
    fn load_account(
        &self,
        account: &LedgerAccount,
    ) -> impl std::future::Future<Output = Result<Vec<LedgerRow>, LedgerError>> + Send;

    /// Atomically apply the writes of one mutation.
    fn commit(
        &self,
        account: &LedgerAccount,
        commit: AccountCommit,
    ) -> impl std::future::Future<Output = Result<(), LedgerError>> + Send;

    /// List every account holding at least one row.
    fn list_accounts(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<LedgerAccount>, LedgerError>> + Send;
}
