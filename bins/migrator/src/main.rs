//! Database migration runner for Comptoir.
//!
//! Usage:
//!   migrator up      - Create the ledger tables
//!   migrator down    - Rollback last migration
//!   migrator status  - Show migration status
//!   migrator fresh   - Drop all tables and re-run migrations
//!
//! Reads `DATABASE_URL`, from the environment or a `.env` file.

use comptoir_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // the CLI installs its own tracing subscriber
    cli::run_cli(Migrator).await;
}
