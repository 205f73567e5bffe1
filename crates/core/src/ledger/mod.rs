//! Running-balance ledger engine.
//!
//! This module implements the core ledger functionality:
//! - Ledger rows and account addressing
//! - Canonical row ordering
//! - Ordered per-account books with cascade recompute
//! - Balance arithmetic and summaries
//! - Business rule validation
//! - Error types for ledger operations
//! - Persistence seam and an in-memory store
//! - Per-account locking
//! - Record adapters' posting trait
//! - Ledger service tying it together

pub mod balance;
pub mod book;
pub mod error;
pub mod locks;
pub mod memory;
pub mod ordering;
pub mod repository;
pub mod service;
pub mod source;
pub mod types;
pub mod validation;

#[cfg(test)]
mod book_props;
#[cfg(test)]
mod validation_props;

pub use balance::{AccountSummary, carry, floor_at_zero, row_delta, running_balances};
pub use book::AccountBook;
pub use error::{AmountField, ErrorCategory, LedgerError};
pub use locks::{AccountGuard, AccountLocks};
pub use memory::InMemoryLedgerRepository;
pub use ordering::{OrderKey, sort_rows};
pub use repository::{AccountCommit, LedgerRepository};
pub use service::{LedgerService, RebalanceReport};
pub use source::LedgerSource;
pub use types::{
    BalanceChange, Commodity, LedgerAccount, LedgerKind, LedgerRow, LedgerRowPatch, NewLedgerRow,
    ParseAccountError, RowKind, StoreNumber,
};
