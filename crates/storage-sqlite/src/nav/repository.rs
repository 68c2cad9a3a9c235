use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use clubfolio_core::clubs::{Club, Fund};
use clubfolio_core::nav::{
    NewUnitValue, UnitValueHistory, UnitValueRepositoryTrait, ValuationState,
};
use clubfolio_core::positions::Position;
use clubfolio_core::{Error, Result};

use super::model::UnitValueDB;
use crate::clubs::{ClubDB, FundDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{not_found_as, StorageError};
use crate::positions::PositionDB;
use crate::schema::{clubs, funds, member_transactions, positions, unit_value_history};
use crate::utils::{chunk_for_sqlite, format_date, parse_decimal};

pub struct UnitValueRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl UnitValueRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        UnitValueRepository { pool, writer }
    }
}

fn read_valuation_state(conn: &mut SqliteConnection, club_id: &str) -> Result<ValuationState> {
    let club: Club = not_found_as(
        clubs::table
            .find(club_id)
            .select(ClubDB::as_select())
            .first(conn),
        "Club",
        club_id,
    )?
    .try_into()?;

    let funds = funds::table
        .filter(funds::club_id.eq(club_id))
        .select(FundDB::as_select())
        .order((funds::created_at.asc(), funds::name.asc()))
        .load(conn)
        .map_err(StorageError::from)?
        .into_iter()
        .map(Fund::try_from)
        .collect::<Result<Vec<_>>>()?;

    let fund_ids: Vec<String> = funds.iter().map(|f| f.id.clone()).collect();
    let mut position_rows = Vec::new();
    for chunk in chunk_for_sqlite(&fund_ids) {
        let rows: Vec<PositionDB> = positions::table
            .filter(positions::fund_id.eq_any(chunk))
            .select(PositionDB::as_select())
            .order((positions::fund_id.asc(), positions::created_at.asc()))
            .load(conn)
            .map_err(StorageError::from)?;
        position_rows.extend(rows);
    }
    let positions = position_rows
        .into_iter()
        .map(Position::try_from)
        .collect::<Result<Vec<_>>>()?;

    let unit_rows = member_transactions::table
        .filter(member_transactions::club_id.eq(club_id))
        .select(member_transactions::units_transacted)
        .load::<String>(conn)
        .map_err(StorageError::from)?;
    let mut total_units_outstanding = Decimal::ZERO;
    for units in &unit_rows {
        total_units_outstanding += parse_decimal(units, "units_transacted")?;
    }

    Ok(ValuationState {
        club,
        funds,
        positions,
        total_units_outstanding,
    })
}

#[async_trait]
impl UnitValueRepositoryTrait for UnitValueRepository {
    /// Runs on a pooled reader connection. The deferred transaction pins one
    /// WAL snapshot from the first SELECT until it ends.
    fn load_valuation_state(&self, club_id: &str) -> Result<ValuationState> {
        let mut conn = get_connection(&self.pool)?;
        conn.transaction::<_, StorageError, _>(|c| {
            read_valuation_state(c, club_id).map_err(StorageError::from)
        })
        .map_err(Error::from)
    }

    /// Inserts a snapshot. A second snapshot for the same club and date is a
    /// unique violation; snapshots are never overwritten.
    async fn create(&self, new_unit_value: NewUnitValue) -> Result<UnitValueHistory> {
        let row = UnitValueDB::from_new(Uuid::new_v4().to_string(), &new_unit_value, Utc::now());
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<UnitValueHistory> {
                let inserted = diesel::insert_into(unit_value_history::table)
                    .values(&row)
                    .returning(UnitValueDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                inserted.try_into()
            })
            .await
    }

    fn get_latest(&self, club_id: &str) -> Result<Option<UnitValueHistory>> {
        let mut conn = get_connection(&self.pool)?;
        unit_value_history::table
            .filter(unit_value_history::club_id.eq(club_id))
            .select(UnitValueDB::as_select())
            .order(unit_value_history::valuation_date.desc())
            .first(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(UnitValueHistory::try_from)
            .transpose()
    }

    fn get_on_date(
        &self,
        club_id: &str,
        valuation_date: NaiveDate,
    ) -> Result<Option<UnitValueHistory>> {
        let mut conn = get_connection(&self.pool)?;
        unit_value_history::table
            .filter(unit_value_history::club_id.eq(club_id))
            .filter(unit_value_history::valuation_date.eq(format_date(valuation_date)))
            .select(UnitValueDB::as_select())
            .first(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(UnitValueHistory::try_from)
            .transpose()
    }

    fn list(
        &self,
        club_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<UnitValueHistory>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = unit_value_history::table
            .filter(unit_value_history::club_id.eq(club_id))
            .select(UnitValueDB::as_select())
            .into_boxed();
        if let Some(from) = from {
            query = query.filter(unit_value_history::valuation_date.ge(format_date(from)));
        }
        if let Some(to) = to {
            query = query.filter(unit_value_history::valuation_date.le(format_date(to)));
        }
        query
            .order(unit_value_history::valuation_date.asc())
            .load(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(UnitValueHistory::try_from)
            .collect()
    }
}
