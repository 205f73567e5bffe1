//! Client loading accounts.

pub mod loading;


pub use loading::{ClientLoading, DebtStatus, LoadingOperation, remaining_due};
