//! Postgres implementation of the ledger repository.
//!
//! Every [`AccountCommit`] runs in one database transaction: the deleted row,
//! the upserted row and every rewritten balance land together or not at all.

use chrono::Utc;
use comptoir_core::ledger::{
    AccountCommit, LedgerAccount, LedgerError, LedgerRepository, LedgerRow, RowKind,
};
use comptoir_shared::types::LedgerRowId;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, Statement, TransactionTrait,
};
use tracing::{debug, instrument};

use crate::entities::ledger_rows;

/// Ledger repository backed by the `ledger_rows` table.
#[derive(Debug, Clone)]
pub struct PgLedgerRepository {
    db: DatabaseConnection,
}

impl PgLedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn delete_row(
        txn: &DatabaseTransaction,
        account_key: &str,
        id: LedgerRowId,
    ) -> Result<(), LedgerError> {
        let result = ledger_rows::Entity::delete_many()
            .filter(ledger_rows::Column::Id.eq(id.into_inner()))
            .filter(ledger_rows::Column::AccountKey.eq(account_key))
            .exec(txn)
            .await
            .map_err(repository_error)?;

        if result.rows_affected == 0 {
            return Err(LedgerError::RowNotFound(id));
        }
        Ok(())
    }

    async fn upsert_row(txn: &DatabaseTransaction, row: &LedgerRow) -> Result<(), LedgerError> {
        let on_conflict = OnConflict::column(ledger_rows::Column::Id)
            .update_columns([
                ledger_rows::Column::SortDate,
                ledger_rows::Column::RowKind,
                ledger_rows::Column::Credit,
                ledger_rows::Column::Debit,
                ledger_rows::Column::Balance,
                ledger_rows::Column::UpdatedAt,
            ])
            .to_owned();

        ledger_rows::Entity::insert(active_model(row))
            .on_conflict(on_conflict)
            .exec(txn)
            .await
            .map_err(repository_error)?;
        Ok(())
    }

    async fn write_balance(
        txn: &DatabaseTransaction,
        account_key: &str,
        id: LedgerRowId,
        balance: rust_decimal::Decimal,
    ) -> Result<(), LedgerError> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        let result = ledger_rows::Entity::update_many()
            .col_expr(ledger_rows::Column::Balance, Expr::value(balance))
            .col_expr(ledger_rows::Column::UpdatedAt, Expr::value(now))
            .filter(ledger_rows::Column::Id.eq(id.into_inner()))
            .filter(ledger_rows::Column::AccountKey.eq(account_key))
            .exec(txn)
            .await
            .map_err(repository_error)?;

        if result.rows_affected == 0 {
            return Err(LedgerError::RowNotFound(id));
        }
        Ok(())
    }
}

impl LedgerRepository for PgLedgerRepository {
    async fn next_sequence(&self) -> Result<i64, LedgerError> {
        let row = self
            .db
            .query_one(Statement::from_string(
                DbBackend::Postgres,
                "SELECT nextval('ledger_row_seq') AS seq",
            ))
            .await
            .map_err(repository_error)?
            .ok_or_else(|| LedgerError::Repository("ledger_row_seq returned no value".to_string()))?;

        row.try_get::<i64>("", "seq").map_err(repository_error)
    }

    async fn find_row(&self, id: LedgerRowId) -> Result<Option<LedgerRow>, LedgerError> {
        ledger_rows::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(repository_error)?
            .map(row_from_model)
            .transpose()
    }

    async fn load_account(&self, account: &LedgerAccount) -> Result<Vec<LedgerRow>, LedgerError> {
        ledger_rows::Entity::find()
            .filter(ledger_rows::Column::AccountKey.eq(account.to_string()))
            .order_by_asc(ledger_rows::Column::SequenceId)
            .all(&self.db)
            .await
            .map_err(repository_error)?
            .into_iter()
            .map(row_from_model)
            .collect()
    }

    #[instrument(skip(self, commit), fields(account = %account))]
    async fn commit(&self, account: &LedgerAccount, commit: AccountCommit) -> Result<(), LedgerError> {
        if commit.is_empty() {
            return Ok(());
        }
        let account_key = account.to_string();
        let txn = self.db.begin().await.map_err(repository_error)?;

        if let Some(id) = commit.delete {
            Self::delete_row(&txn, &account_key, id).await?;
        }
        if let Some(row) = &commit.upsert {
            if &row.account != account {
                return Err(LedgerError::Internal(format!(
                    "row {} does not belong to {account}",
                    row.id
                )));
            }
            Self::upsert_row(&txn, row).await?;
        }
        for change in &commit.balances {
            Self::write_balance(&txn, &account_key, change.row_id, change.current).await?;
        }

        txn.commit().await.map_err(repository_error)?;
        debug!(balances = commit.balances.len(), "ledger commit applied");
        Ok(())
    }

    async fn list_accounts(&self) -> Result<Vec<LedgerAccount>, LedgerError> {
        let keys: Vec<String> = ledger_rows::Entity::find()
            .select_only()
            .column(ledger_rows::Column::AccountKey)
            .distinct()
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(repository_error)?;

        keys.iter()
            .map(|key| {
                key.parse::<LedgerAccount>()
                    .map_err(|e| LedgerError::Internal(e.to_string()))
            })
            .collect()
    }
}

fn repository_error(err: DbErr) -> LedgerError {
    LedgerError::Repository(err.to_string())
}

/// Converts a stored row into the engine's row.
///
/// # Errors
///
/// Returns `LedgerError::Internal` if the account key or row kind is corrupt.
pub fn row_from_model(model: ledger_rows::Model) -> Result<LedgerRow, LedgerError> {
    let account = model
        .account_key
        .parse::<LedgerAccount>()
        .map_err(|e| LedgerError::Internal(e.to_string()))?;
    let row_kind = model
        .row_kind
        .parse::<RowKind>()
        .map_err(|e| LedgerError::Internal(e.to_string()))?;

    Ok(LedgerRow {
        id: LedgerRowId::from_uuid(model.id),
        account,
        sort_date: model.sort_date,
        sequence_id: model.sequence_id,
        row_kind,
        credit: model.credit,
        debit: model.debit,
        balance: model.balance,
    })
}

/// Builds the insert model for a row.
#[must_use]
pub fn active_model(row: &LedgerRow) -> ledger_rows::ActiveModel {
    let now = Utc::now().into();
    ledger_rows::ActiveModel {
        id: Set(row.id.into_inner()),
        account_key: Set(row.account.to_string()),
        ledger_kind: Set(row.account.kind().as_str().to_string()),
        sort_date: Set(row.sort_date),
        sequence_id: Set(row.sequence_id),
        row_kind: Set(row.row_kind.as_str().to_string()),
        credit: Set(row.credit),
        debit: Set(row.debit),
        balance: Set(row.balance),
        created_at: Set(now),
        updated_at: Set(now),
    }
}
