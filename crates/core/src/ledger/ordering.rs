//! Ordering of rows within one account.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::types::{LedgerRow, RowKind};

/// Position of a row in its account: `(kind_rank, sort_date, sequence_id)`.
///
/// Field order drives the derived `Ord`. Settlement rows carry
/// `kind_rank = 1` and therefore sort after every movement row; equal dates
/// fall back to the insertion sequence, never to the row id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderKey {
    /// 0 for movements, 1 for settlements.
    pub kind_rank: u8,
    /// Row date.
    pub sort_date: NaiveDate,
    /// Insertion sequence.
    pub sequence_id: i64,
}

impl OrderKey {
    /// Builds the key from its parts.
    #[must_use]
    pub const fn new(row_kind: RowKind, sort_date: NaiveDate, sequence_id: i64) -> Self {
        Self {
            kind_rank: row_kind.rank(),
            sort_date,
            sequence_id,
        }
    }
}

/// Returns the ordering key of a row.
#[must_use]
pub fn order_key(row: &LedgerRow) -> OrderKey {
    row.order_key()
}

/// Sorts rows into ledger order.
pub fn sort_rows(rows: &mut [LedgerRow]) {
    rows.sort_by_key(order_key);
}
