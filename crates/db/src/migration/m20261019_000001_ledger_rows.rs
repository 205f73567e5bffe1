//! Ledger rows migration.
//!
//! Creates the running-balance table shared by client, employee and stock
//! ledgers, plus the sequence handing out insertion order.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(LEDGER_ROWS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS ledger_rows CASCADE; DROP SEQUENCE IF EXISTS ledger_row_seq;",
        )
        .await?;
        Ok(())
    }
}

const LEDGER_ROWS_SQL: &str = r"
-- Insertion order, the tie break after the sort date
CREATE SEQUENCE ledger_row_seq AS BIGINT START WITH 1;

CREATE TABLE ledger_rows (
    id UUID PRIMARY KEY,
    -- client:<uuid> | employee:<uuid> | stock:<store>:<commodity>
    account_key TEXT NOT NULL,
    ledger_kind VARCHAR(16) NOT NULL,
    sort_date DATE NOT NULL,
    sequence_id BIGINT NOT NULL,
    row_kind VARCHAR(16) NOT NULL DEFAULT 'movement',
    credit NUMERIC,
    debit NUMERIC,
    balance NUMERIC NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_ledger_rows_sequence UNIQUE (sequence_id),
    CONSTRAINT chk_ledger_kind CHECK (ledger_kind IN ('client', 'employee', 'stock')),
    CONSTRAINT chk_row_kind CHECK (row_kind IN ('movement', 'settlement')),
    CONSTRAINT chk_settlement_on_client CHECK (row_kind = 'movement' OR ledger_kind = 'client'),
    CONSTRAINT chk_credit_non_negative CHECK (credit IS NULL OR credit >= 0),
    CONSTRAINT chk_debit_non_negative CHECK (debit IS NULL OR debit >= 0),
    CONSTRAINT chk_amount_present CHECK (
        ledger_kind = 'stock' OR credit IS NOT NULL OR debit IS NOT NULL
    )
);

-- Rows of one account in ledger order
CREATE INDEX idx_ledger_rows_order
    ON ledger_rows(account_key, (row_kind = 'settlement'), sort_date, sequence_id);
";
