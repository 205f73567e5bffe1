//! Warehouse stock movements.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::{LedgerAccount, LedgerError, LedgerSource, NewLedgerRow, RowKind, StoreNumber};

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockDirection {
    /// Sacks entering the store.
    In,
    /// Sacks leaving the store.
    Out,
}

/// Sacks of one commodity entering or leaving a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    /// Store the sacks are counted in.
    pub store: StoreNumber,
    /// Commodity, e.g. "Karité" or "Maïs".
    pub commodity: String,
    /// Movement date.
    pub date: NaiveDate,
    /// Entry or exit.
    pub direction: StockDirection,
    /// Number of sacks.
    pub sacks: u32,
    /// Weight of one sack (kg).
    pub weight_per_sack: Decimal,
}

impl StockMovement {
    /// Total weight moved (kg).
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AmountOverflow` if the weight is out of range.
    pub fn tonnage_total(&self) -> Result<Decimal, LedgerError> {
        Decimal::from(self.sacks)
            .checked_mul(self.weight_per_sack)
            .ok_or(LedgerError::AmountOverflow("tonnage"))
    }
}

impl LedgerSource for StockMovement {
    fn account(&self) -> LedgerAccount {
        LedgerAccount::stock(self.store, &self.commodity)
    }

    fn ledger_row(&self) -> Result<NewLedgerRow, LedgerError> {
        let sacks = Some(Decimal::from(self.sacks));
        let (credit, debit) = match self.direction {
            StockDirection::In => (sacks, None),
            StockDirection::Out => (None, sacks),
        };
        Ok(NewLedgerRow {
            account: self.account(),
            sort_date: self.date,
            row_kind: RowKind::Movement,
            credit,
            debit,
        })
    }
}
