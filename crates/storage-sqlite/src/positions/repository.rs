use diesel::prelude::*;
use std::sync::Arc;

use clubfolio_core::positions::{Position, PositionRepositoryTrait};
use clubfolio_core::Result;

use super::model::PositionDB;
use crate::db::{get_connection, DbPool};
use crate::errors::StorageError;
use crate::schema::positions;
use crate::utils::chunk_for_sqlite;

pub struct PositionRepository {
    pool: Arc<DbPool>,
}

impl PositionRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        PositionRepository { pool }
    }
}

impl PositionRepositoryTrait for PositionRepository {
    fn get_position(&self, fund_id: &str, asset_id: &str) -> Result<Option<Position>> {
        let mut conn = get_connection(&self.pool)?;
        positions::table
            .filter(positions::fund_id.eq(fund_id))
            .filter(positions::asset_id.eq(asset_id))
            .select(PositionDB::as_select())
            .first(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(Position::try_from)
            .transpose()
    }

    fn list_by_fund(&self, fund_id: &str) -> Result<Vec<Position>> {
        let mut conn = get_connection(&self.pool)?;
        positions::table
            .filter(positions::fund_id.eq(fund_id))
            .select(PositionDB::as_select())
            .order(positions::created_at.asc())
            .load(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(Position::try_from)
            .collect()
    }

    fn list_by_funds(&self, fund_ids: &[String]) -> Result<Vec<Position>> {
        let mut conn = get_connection(&self.pool)?;
        let mut rows = Vec::new();
        for chunk in chunk_for_sqlite(fund_ids) {
            let chunk_rows: Vec<PositionDB> = positions::table
                .filter(positions::fund_id.eq_any(chunk))
                .select(PositionDB::as_select())
                .order((positions::fund_id.asc(), positions::created_at.asc()))
                .load(&mut conn)
                .map_err(StorageError::from)?;
            rows.extend(chunk_rows);
        }
        rows.into_iter().map(Position::try_from).collect()
    }
}
