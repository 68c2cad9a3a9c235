use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use std::sync::Arc;

use clubfolio_core::transactions::{
    Page, Transaction, TransactionFilter, TransactionPage, TransactionRepositoryTrait,
};
use clubfolio_core::Result;

use super::model::TransactionDB;
use crate::db::{get_connection, DbPool};
use crate::errors::{not_found_as, StorageError};
use crate::schema::transactions;
use crate::utils::format_date;

pub struct TransactionRepository {
    pool: Arc<DbPool>,
}

impl TransactionRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        TransactionRepository { pool }
    }
}

fn filtered(filter: &TransactionFilter) -> transactions::BoxedQuery<'_, Sqlite> {
    let mut query = transactions::table
        .filter(transactions::club_id.eq(&filter.club_id))
        .into_boxed();

    if let Some(fund_id) = &filter.fund_id {
        query = query.filter(transactions::fund_id.eq(fund_id));
    }
    if let Some(asset_id) = &filter.asset_id {
        query = query.filter(transactions::asset_id.eq(asset_id));
    }
    if let Some(kind) = filter.transaction_type {
        query = query.filter(transactions::transaction_type.eq(kind.as_str()));
    }
    // 'YYYY-MM-DD' compares correctly as text.
    if let Some(from) = filter.date_from {
        query = query.filter(transactions::transaction_date.ge(format_date(from)));
    }
    if let Some(to) = filter.date_to {
        query = query.filter(transactions::transaction_date.le(format_date(to)));
    }
    query
}

impl TransactionRepositoryTrait for TransactionRepository {
    fn get_by_id(&self, transaction_id: &str) -> Result<Transaction> {
        let mut conn = get_connection(&self.pool)?;
        not_found_as(
            transactions::table
                .find(transaction_id)
                .select(TransactionDB::as_select())
                .first(&mut conn),
            "Transaction",
            transaction_id,
        )?
        .try_into()
    }

    fn find_reversal_of(&self, transaction_id: &str) -> Result<Option<Transaction>> {
        let mut conn = get_connection(&self.pool)?;
        transactions::table
            .filter(transactions::reverses_transaction_id.eq(transaction_id))
            .select(TransactionDB::as_select())
            .first(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(Transaction::try_from)
            .transpose()
    }

    fn list(&self, filter: &TransactionFilter, page: Page) -> Result<TransactionPage> {
        let mut conn = get_connection(&self.pool)?;

        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .map_err(StorageError::from)?;

        let rows = filtered(filter)
            .select(TransactionDB::as_select())
            .order((
                transactions::transaction_date.desc(),
                transactions::created_at.desc(),
            ))
            .offset(page.offset)
            .limit(page.limit)
            .load(&mut conn)
            .map_err(StorageError::from)?;

        Ok(TransactionPage {
            items: rows
                .into_iter()
                .map(Transaction::try_from)
                .collect::<Result<Vec<_>>>()?,
            total,
            offset: page.offset,
            limit: page.limit,
        })
    }
}
