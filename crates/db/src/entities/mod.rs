//! `SeaORM` entity definitions.

pub mod ledger_rows;

pub use ledger_rows::Entity as LedgerRows;
