//! Employee expense accounts.
//!
//! Money handed to an employee posts as a credit, money they spend as a
//! debit; the balance is what the employee still holds.

use chrono::NaiveDate;
use comptoir_shared::types::EmployeeId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::{LedgerAccount, LedgerError, LedgerSource, NewLedgerRow, RowKind};

/// One hand-over or expense line of an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeExpense {
    /// Employee holding the money.
    pub employee: EmployeeId,
    /// Date of the line.
    pub date: NaiveDate,
    /// Amount handed to the employee.
    pub amount_handed: Option<Decimal>,
    /// What the money was spent on.
    pub expense_name: Option<String>,
    /// Amount spent by the employee.
    pub amount_spent: Option<Decimal>,
}

impl LedgerSource for EmployeeExpense {
    fn account(&self) -> LedgerAccount {
        LedgerAccount::Employee(self.employee)
    }

    fn ledger_row(&self) -> Result<NewLedgerRow, LedgerError> {
        Ok(NewLedgerRow {
            account: self.account(),
            sort_date: self.date,
            row_kind: RowKind::Movement,
            credit: self.amount_handed,
            debit: self.amount_spent,
        })
    }
}
