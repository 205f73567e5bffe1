//! Truck loadings drawn from a store.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::movement::{StockDirection, StockMovement};
use crate::ledger::{LedgerAccount, LedgerError, LedgerSource, NewLedgerRow, StoreNumber};

/// Sacks loaded onto a truck from one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruckLoading {
    /// Store the sacks leave.
    pub store: StoreNumber,
    /// Commodity loaded.
    pub commodity: String,
    /// Loading date.
    pub loading_date: NaiveDate,
    /// Number of sacks loaded.
    pub sacks: u32,
    /// Weight of one sack at departure (kg).
    pub weight_per_sack: Decimal,
    /// Weight measured on arrival (kg), once known.
    pub arrived_weight: Option<Decimal>,
}

impl TruckLoading {
    /// Weight at departure (kg).
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AmountOverflow` if the weight is out of range.
    pub fn tonnage_total(&self) -> Result<Decimal, LedgerError> {
        self.as_movement().tonnage_total()
    }

    /// Weight lost on the road, never negative. `None` until the truck has
    /// been weighed on arrival.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AmountOverflow` if the weight is out of range.
    pub fn missing_weight(&self) -> Result<Option<Decimal>, LedgerError> {
        let Some(arrived) = self.arrived_weight else {
            return Ok(None);
        };
        let missing = self
            .tonnage_total()?
            .checked_sub(arrived)
            .ok_or(LedgerError::AmountOverflow("missing weight"))?;
        Ok(Some(missing.max(Decimal::ZERO)))
    }

    /// The stock exit this loading amounts to.
    #[must_use]
    pub fn as_movement(&self) -> StockMovement {
        StockMovement {
            store: self.store,
            commodity: self.commodity.clone(),
            date: self.loading_date,
            direction: StockDirection::Out,
            sacks: self.sacks,
            weight_per_sack: self.weight_per_sack,
        }
    }
}

impl LedgerSource for TruckLoading {
    fn account(&self) -> LedgerAccount {
        LedgerAccount::stock(self.store, &self.commodity)
    }

    fn ledger_row(&self) -> Result<NewLedgerRow, LedgerError> {
        self.as_movement().ledger_row()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn truck(arrived: Option<Decimal>) -> TruckLoading {
        TruckLoading {
            store: StoreNumber(1),
            commodity: "Maïs".to_string(),
            loading_date: NaiveDate::from_ymd_opt(2025, 9, 12).unwrap(),
            sacks: 200,
            weight_per_sack: dec!(100),
            arrived_weight: arrived,
        }
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some(dec!(19850)), Some(dec!(150)))]
    #[case(Some(dec!(20000)), Some(dec!(0)))]
    #[case(Some(dec!(20100)), Some(dec!(0)))]
    fn test_missing_weight(#[case] arrived: Option<Decimal>, #[case] expected: Option<Decimal>) {
        assert_eq!(truck(arrived).missing_weight().unwrap(), expected);
    }

    #[test]
    fn test_posts_stock_exit() {
        let row = truck(None).ledger_row().unwrap();
        assert_eq!(row.account, LedgerAccount::stock(StoreNumber(1), "Maïs"));
        assert_eq!(row.credit, None);
        assert_eq!(row.debit, Some(dec!(200)));
    }
}
