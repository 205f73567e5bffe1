//! `SeaORM` Entity for ledger_rows table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_rows")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_key: String,
    pub ledger_kind: String,
    pub sort_date: Date,
    #[sea_orm(unique)]
    pub sequence_id: i64,
    pub row_kind: String,
    #[sea_orm(column_type = "Decimal(None)", nullable)]
    pub credit: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(None)", nullable)]
    pub debit: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(None)")]
    pub balance: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
