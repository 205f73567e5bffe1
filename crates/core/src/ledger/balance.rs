//! Balance arithmetic and account summaries.
//!
//! The delta rule is `credit - debit` with missing amounts counting as zero.
//! Balances may be negative for money ledgers (the counterparty is owed);
//! [`floor_at_zero`] exists only for display aggregates.
//!
//! All sums are checked: an amount outside the `Decimal` range surfaces as
//! [`LedgerError::AmountOverflow`] instead of a panic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::book::AccountBook;
use super::error::LedgerError;
use super::types::{LedgerAccount, LedgerRow};

/// Net effect of one row on the running balance.
///
/// # Errors
///
/// Returns `LedgerError::AmountOverflow` if the difference is out of range.
pub fn row_delta(credit: Option<Decimal>, debit: Option<Decimal>) -> Result<Decimal, LedgerError> {
    credit
        .unwrap_or(Decimal::ZERO)
        .checked_sub(debit.unwrap_or(Decimal::ZERO))
        .ok_or(LedgerError::AmountOverflow("row delta"))
}

/// Adds a row delta to a running balance.
///
/// # Errors
///
/// Returns `LedgerError::AmountOverflow` if the sum is out of range.
pub fn carry(running: Decimal, delta: Decimal) -> Result<Decimal, LedgerError> {
    running
        .checked_add(delta)
        .ok_or(LedgerError::AmountOverflow("running balance"))
}

/// Running balances of rows already in ledger order, starting from zero.
///
/// # Errors
///
/// Returns `LedgerError::AmountOverflow` if a balance is out of range.
pub fn running_balances(rows: &[LedgerRow]) -> Result<Vec<Decimal>, LedgerError> {
    let mut running = Decimal::ZERO;
    rows.iter()
        .map(|row| {
            running = carry(running, row.delta()?)?;
            Ok(running)
        })
        .collect()
}

/// Clamps a displayed aggregate at zero.
///
/// Stock screens never show negative sack counts; the ledger itself keeps the
/// true value.
#[must_use]
pub fn floor_at_zero(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// Totals of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    /// The account.
    pub account: LedgerAccount,
    /// Number of rows.
    pub rows: usize,
    /// Sum of credits.
    pub total_credit: Decimal,
    /// Sum of debits.
    pub total_debit: Decimal,
    /// Balance after the last row.
    pub closing_balance: Decimal,
}

impl AccountSummary {
    /// Summarises a book.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AmountOverflow` if a total is out of range.
    pub fn from_book(book: &AccountBook) -> Result<Self, LedgerError> {
        let mut total_credit = Decimal::ZERO;
        let mut total_debit = Decimal::ZERO;
        for row in book.rows() {
            total_credit = total_credit
                .checked_add(row.credit.unwrap_or(Decimal::ZERO))
                .ok_or(LedgerError::AmountOverflow("total credit"))?;
            total_debit = total_debit
                .checked_add(row.debit.unwrap_or(Decimal::ZERO))
                .ok_or(LedgerError::AmountOverflow("total debit"))?;
        }

        Ok(Self {
            account: book.account().clone(),
            rows: book.len(),
            total_credit,
            total_debit,
            closing_balance: book.closing_balance(),
        })
    }

    /// Returns true if the closing balance equals credits minus debits.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.total_credit
            .checked_sub(self.total_debit)
            .is_some_and(|net| net == self.closing_balance)
    }
}
