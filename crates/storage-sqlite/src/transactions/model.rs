//! Database model for ledger transactions.

use diesel::prelude::*;

use crate::utils::{
    format_date, format_decimal, format_timestamp, parse_code, parse_date, parse_decimal,
    parse_optional_decimal, parse_timestamp,
};
use clubfolio_core::transactions::Transaction;
use clubfolio_core::Error;

/// Database model for transactions. Rows are insert-only.
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionDB {
    pub id: String,
    pub club_id: String,
    pub fund_id: Option<String>,
    pub asset_id: Option<String>,
    pub transaction_type: String,
    pub transaction_date: String,
    pub quantity: Option<String>,
    pub price_per_unit: Option<String>,
    pub total_amount: String,
    pub fees: String,
    pub description: Option<String>,
    pub related_transaction_id: Option<String>,
    pub reverses_transaction_id: Option<String>,
    pub created_at: String,
}

impl From<&Transaction> for TransactionDB {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id.clone(),
            club_id: tx.club_id.clone(),
            fund_id: tx.fund_id.clone(),
            asset_id: tx.asset_id.clone(),
            transaction_type: tx.transaction_type.as_str().to_string(),
            transaction_date: format_date(tx.transaction_date),
            quantity: tx.quantity.map(format_decimal),
            price_per_unit: tx.price_per_unit.map(format_decimal),
            total_amount: format_decimal(tx.total_amount),
            fees: format_decimal(tx.fees),
            description: tx.description.clone(),
            related_transaction_id: tx.related_transaction_id.clone(),
            reverses_transaction_id: tx.reverses_transaction_id.clone(),
            created_at: format_timestamp(tx.created_at),
        }
    }
}

impl TryFrom<TransactionDB> for Transaction {
    type Error = Error;

    fn try_from(db: TransactionDB) -> Result<Self, Self::Error> {
        Ok(Self {
            transaction_type: parse_code(&db.transaction_type, "transaction_type")?,
            transaction_date: parse_date(&db.transaction_date, "transaction_date")?,
            quantity: parse_optional_decimal(db.quantity.as_deref(), "quantity")?,
            price_per_unit: parse_optional_decimal(db.price_per_unit.as_deref(), "price_per_unit")?,
            total_amount: parse_decimal(&db.total_amount, "total_amount")?,
            fees: parse_decimal(&db.fees, "fees")?,
            created_at: parse_timestamp(&db.created_at, "created_at")?,
            id: db.id,
            club_id: db.club_id,
            fund_id: db.fund_id,
            asset_id: db.asset_id,
            description: db.description,
            related_transaction_id: db.related_transaction_id,
            reverses_transaction_id: db.reverses_transaction_id,
        })
    }
}
