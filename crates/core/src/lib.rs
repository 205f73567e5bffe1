//! Core business logic for Comptoir.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! The running-balance engine and the record types that post into it live here.
//!
//! # Modules
//!
//! - `ledger` - Running-balance ledgers with cascade recompute
//! - `customers` - Client loading accounts
//! - `employees` - Employee expense accounts
//! - `stock` - Sack counts per store and commodity

pub mod customers;
pub mod employees;
pub mod ledger;
pub mod stock;
