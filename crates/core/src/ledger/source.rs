//! Records that post into a ledger.

use super::error::LedgerError;
use super::types::{LedgerAccount, LedgerRowPatch, NewLedgerRow};

/// A business record that maps onto exactly one ledger row.
///
/// Client loadings, employee expenses and stock movements implement this so
/// the service never sees their derived-field rules.
pub trait LedgerSource {
    /// Account the record posts into.
    fn account(&self) -> LedgerAccount;

    /// Row to insert for a new record.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AmountOverflow` if a derived amount is out of
    /// range.
    fn ledger_row(&self) -> Result<NewLedgerRow, LedgerError>;

    /// Patch overwriting every posted field, for an edited record.
    ///
    /// # Errors
    ///
    /// Same as [`Self::ledger_row`].
    fn ledger_patch(&self) -> Result<LedgerRowPatch, LedgerError> {
        let row = self.ledger_row()?;
        Ok(LedgerRowPatch {
            sort_date: Some(row.sort_date),
            row_kind: Some(row.row_kind),
            credit: Some(row.credit),
            debit: Some(row.debit),
        })
    }
}
