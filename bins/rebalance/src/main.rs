//! Running-balance repair job.
//!
//! Rows saved by the old per-row computation carry balances that ignore
//! later backdated edits. This job recomputes every account, or only the
//! accounts named on the command line, and reports what changed.
//!
//! Usage:
//!   rebalance                         - recompute every account
//!   rebalance client:<uuid> ...       - recompute the given accounts

use std::sync::Arc;

use anyhow::{Context, bail};
use comptoir_core::ledger::{LedgerAccount, LedgerService};
use comptoir_db::{PgLedgerRepository, connect_with};
use comptoir_shared::AppConfig;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "comptoir_core=info,comptoir_db=info,rebalance=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let db = connect_with(&config.database).await?;
    info!("Connected to database");

    let service = LedgerService::new(Arc::new(PgLedgerRepository::new(db)), config.ledger);

    let accounts = std::env::args()
        .skip(1)
        .map(|arg| {
            arg.parse::<LedgerAccount>()
                .with_context(|| format!("invalid account key {arg:?}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    if accounts.is_empty() {
        let report = service.recompute_all().await?;
        info!(
            accounts = report.accounts,
            rows_changed = report.rows_changed,
            failures = report.failures.len(),
            "Rebalance complete"
        );
        if !report.failures.is_empty() {
            bail!("{} accounts could not be recomputed", report.failures.len());
        }
        return Ok(());
    }

    let mut failed = 0usize;
    for account in &accounts {
        match service.recompute(account).await {
            Ok(changes) => info!(%account, rows_changed = changes.len(), "Account recomputed"),
            Err(err) => {
                error!(%account, error = %err, "Account recompute failed");
                failed += 1;
            }
        }
    }
    if failed > 0 {
        bail!("{failed} accounts could not be recomputed");
    }
    Ok(())
}
