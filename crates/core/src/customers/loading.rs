//! Client loading records.
//!
//! A loading is either product delivered to the client, an advance paid by
//! the client, or a settlement closing the period. The advance posts as a
//! credit and the total due as a debit, so a negative balance means the
//! client still owes us.

use std::cmp::Ordering;

use chrono::NaiveDate;
use comptoir_shared::types::ClientId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::{LedgerAccount, LedgerError, LedgerSource, NewLedgerRow, RowKind};

/// Kind of client loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadingOperation {
    /// Product loaded for the client.
    #[default]
    Product,
    /// Money advanced by the client.
    Advance,
    /// Settlement closing the period.
    Settlement,
}

impl LoadingOperation {
    /// Ledger row kind this operation posts as.
    #[must_use]
    pub const fn row_kind(self) -> RowKind {
        match self {
            Self::Settlement => RowKind::Settlement,
            Self::Product | Self::Advance => RowKind::Movement,
        }
    }
}

/// Who owes whom on a single loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtStatus {
    /// The total exceeds the advance.
    ClientOwes,
    /// The advance exceeds the total.
    WeOwe,
    /// Total and advance match.
    Settled,
}

impl DebtStatus {
    /// Compares the total with the advance, missing amounts counting as zero.
    #[must_use]
    pub fn from_amounts(total: Option<Decimal>, advance: Option<Decimal>) -> Self {
        match total
            .unwrap_or(Decimal::ZERO)
            .cmp(&advance.unwrap_or(Decimal::ZERO))
        {
            Ordering::Equal => Self::Settled,
            Ordering::Greater => Self::ClientOwes,
            Ordering::Less => Self::WeOwe,
        }
    }
}

/// A client loading record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientLoading {
    /// Client the goods or money belong to.
    pub client: ClientId,
    /// Loading date.
    pub loading_date: NaiveDate,
    /// Operation type.
    pub operation: LoadingOperation,
    /// Product name, free text.
    #[serde(default)]
    pub product_name: String,
    /// Number of sacks.
    pub sacks: Option<u32>,
    /// Weight per sack (kg).
    pub weight: Option<Decimal>,
    /// Weight of one empty sack (kg), deducted from the tonnage.
    pub empty_sack_weight: Option<Decimal>,
    /// Price per kg.
    pub price_per_kg: Option<Decimal>,
    /// Total entered by hand; only kept on settlements.
    pub manual_total: Option<Decimal>,
    /// Advance paid by the client.
    pub advance: Option<Decimal>,
}

impl ClientLoading {
    /// Net tonnage (kg): `sacks × weight`, minus the empty sacks when their
    /// weight is positive. `None` unless both sacks and weight are known.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AmountOverflow` if the weight is out of range.
    pub fn tonnage(&self) -> Result<Option<Decimal>, LedgerError> {
        let (Some(sacks), Some(weight)) = (self.sacks, self.weight) else {
            return Ok(None);
        };
        let sacks = Decimal::from(sacks);
        let overflow = || LedgerError::AmountOverflow("tonnage");

        let gross = sacks.checked_mul(weight).ok_or_else(overflow)?;
        let net = match self.empty_sack_weight {
            Some(empty) if empty > Decimal::ZERO => sacks
                .checked_mul(empty)
                .and_then(|tare| gross.checked_sub(tare))
                .ok_or_else(overflow)?,
            _ => gross,
        };
        Ok(Some(net))
    }

    /// Total due: `tonnage × price_per_kg`.
    ///
    /// Settlements keep a manually entered total and only fall back to the
    /// computed one when none was given.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AmountOverflow` if the total is out of range.
    pub fn total(&self) -> Result<Option<Decimal>, LedgerError> {
        if let (LoadingOperation::Settlement, Some(manual)) = (self.operation, self.manual_total) {
            return Ok(Some(manual));
        }
        let (Some(tonnage), Some(price)) = (self.tonnage()?, self.price_per_kg) else {
            return Ok(None);
        };
        tonnage
            .checked_mul(price)
            .map(Some)
            .ok_or(LedgerError::AmountOverflow("total"))
    }

    /// Who owes whom on this loading alone.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AmountOverflow` if the total is out of range.
    pub fn debt_status(&self) -> Result<DebtStatus, LedgerError> {
        Ok(DebtStatus::from_amounts(self.total()?, self.advance))
    }
}

impl LedgerSource for ClientLoading {
    fn account(&self) -> LedgerAccount {
        LedgerAccount::Client(self.client)
    }

    fn ledger_row(&self) -> Result<NewLedgerRow, LedgerError> {
        Ok(NewLedgerRow {
            account: self.account(),
            sort_date: self.loading_date,
            row_kind: self.operation.row_kind(),
            credit: self.advance,
            debit: self.total()?,
        })
    }
}

/// Amount the client still owes after a row, as shown on loading sheets.
///
/// The ledger balance is `advances - totals`; the sheet shows the opposite
/// sign.
#[must_use]
pub fn remaining_due(balance: Decimal) -> Decimal {
    -balance
}
