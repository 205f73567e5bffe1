//! Stock accounts: sacks per store and commodity.
//!
//! Entries post as credits and exits (including truck loadings) as debits.
//! The ledger refuses any change that leaves a negative sack count anywhere
//! in the chain.

pub mod movement;
pub mod truck;


use rust_decimal::Decimal;

use crate::ledger::{AccountSummary, floor_at_zero};

pub use movement::{StockDirection, StockMovement};
pub use truck::TruckLoading;

/// Sacks shown as available for an account, floored at zero.
#[must_use]
pub fn available_sacks(summary: &AccountSummary) -> Decimal {
    floor_at_zero(summary.closing_balance)
}
