//! Ledger error types.
//!
//! Validation failures are raised before anything is written; every other
//! failure leaves previously committed balances untouched.

use std::fmt;

use comptoir_shared::AppError;
use comptoir_shared::types::LedgerRowId;
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::{LedgerAccount, LedgerKind};

/// Which amount a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountField {
    /// The credit amount.
    Credit,
    /// The debit amount.
    Debit,
}

impl fmt::Display for AmountField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Credit => f.write_str("credit"),
            Self::Debit => f.write_str("debit"),
        }
    }
}

/// Coarse error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rejected input, nothing persisted.
    Validation,
    /// Referenced row or account does not exist.
    NotFound,
    /// A safety bound was exceeded.
    ResourceExhausted,
    /// Lock contention; safe to retry.
    ConcurrencyConflict,
    /// Storage or invariant failure.
    Internal,
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Neither credit nor debit was supplied on a ledger that needs one.
    #[error("Ledger row must have a credit or a debit amount")]
    EmptyLedgerRow,

    /// An amount is negative.
    #[error("{field} amount cannot be negative")]
    NegativeAmount {
        /// The offending amount.
        field: AmountField,
    },

    /// The change would drive a stock count below zero.
    #[error("Insufficient stock: row {row_id} would leave a balance of {balance}")]
    InsufficientStock {
        /// First row whose balance would go negative.
        row_id: LedgerRowId,
        /// The balance it would reach.
        balance: Decimal,
    },

    /// Settlement rows are only valid on client ledgers.
    #[error("Settlement rows are not allowed on {0} ledgers")]
    SettlementNotAllowed(LedgerKind),

    /// An amount is too large to be summed or multiplied.
    #[error("Amount overflow while computing the {0}")]
    AmountOverflow(&'static str),

    // ========== Not Found Errors ==========
    /// Row not found.
    #[error("Ledger row not found: {0}")]
    RowNotFound(LedgerRowId),

    /// Account has no rows.
    #[error("Ledger account not found: {0}")]
    AccountNotFound(LedgerAccount),

    // ========== Resource Errors ==========
    /// Account exceeds the configured row bound.
    #[error("Account {account} holds {rows} rows, limit is {limit}")]
    ResourceExhausted {
        /// The account.
        account: LedgerAccount,
        /// Rows the operation would have to walk.
        rows: usize,
        /// Configured limit.
        limit: usize,
    },

    // ========== Concurrency Errors ==========
    /// Timed out waiting for the account lock.
    #[error("Account {0} is busy, please retry")]
    ConcurrencyConflict(LedgerAccount),

    // ========== Infrastructure Errors ==========
    /// Storage error.
    #[error("Repository error: {0}")]
    Repository(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the taxonomy bucket of this error.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptyLedgerRow
            | Self::NegativeAmount { .. }
            | Self::InsufficientStock { .. }
            | Self::SettlementNotAllowed(_)
            | Self::AmountOverflow(_) => ErrorCategory::Validation,
            Self::RowNotFound(_) | Self::AccountNotFound(_) => ErrorCategory::NotFound,
            Self::ResourceExhausted { .. } => ErrorCategory::ResourceExhausted,
            Self::ConcurrencyConflict(_) => ErrorCategory::ConcurrencyConflict,
            Self::Repository(_) | Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyLedgerRow => "EMPTY_LEDGER_ROW",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::SettlementNotAllowed(_) => "SETTLEMENT_NOT_ALLOWED",
            Self::AmountOverflow(_) => "AMOUNT_OVERFLOW",
            Self::RowNotFound(_) => "ROW_NOT_FOUND",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::ResourceExhausted { .. } => "RESOURCE_EXHAUSTED",
            Self::ConcurrencyConflict(_) => "CONCURRENCY_CONFLICT",
            Self::Repository(_) => "REPOSITORY_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        if let Self::InsufficientStock { .. } = self {
            return 422;
        }
        match self.category() {
            ErrorCategory::Validation => 400,
            ErrorCategory::NotFound => 404,
            ErrorCategory::ConcurrencyConflict => 409,
            ErrorCategory::ResourceExhausted => 507,
            ErrorCategory::Internal => 500,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict(_))
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err.category() {
            ErrorCategory::Validation => match err {
                LedgerError::InsufficientStock { .. } => Self::BusinessRule(message),
                _ => Self::Validation(message),
            },
            ErrorCategory::NotFound => Self::NotFound(message),
            ErrorCategory::ResourceExhausted => Self::ResourceExhausted(message),
            ErrorCategory::ConcurrencyConflict => Self::Conflict(message),
            ErrorCategory::Internal => match err {
                LedgerError::Repository(_) => Self::Database(message),
                _ => Self::Internal(message),
            },
        }
    }
}
