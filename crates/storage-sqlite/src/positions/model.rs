//! Database model for positions.

use diesel::prelude::*;

use crate::utils::{format_decimal, format_timestamp, parse_decimal, parse_timestamp};
use clubfolio_core::positions::Position;
use clubfolio_core::Error;

#[derive(
    Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::positions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PositionDB {
    pub id: String,
    pub fund_id: String,
    pub asset_id: String,
    pub quantity: String,
    pub average_cost_basis: String,
    pub version: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Position> for PositionDB {
    fn from(position: &Position) -> Self {
        Self {
            id: position.id.clone(),
            fund_id: position.fund_id.clone(),
            asset_id: position.asset_id.clone(),
            quantity: format_decimal(position.quantity),
            average_cost_basis: format_decimal(position.average_cost_basis),
            version: position.version,
            created_at: format_timestamp(position.created_at),
            updated_at: format_timestamp(position.updated_at),
        }
    }
}

impl TryFrom<PositionDB> for Position {
    type Error = Error;

    fn try_from(db: PositionDB) -> Result<Self, Self::Error> {
        Ok(Self {
            quantity: parse_decimal(&db.quantity, "quantity")?,
            average_cost_basis: parse_decimal(&db.average_cost_basis, "average_cost_basis")?,
            created_at: parse_timestamp(&db.created_at, "created_at")?,
            updated_at: parse_timestamp(&db.updated_at, "updated_at")?,
            id: db.id,
            fund_id: db.fund_id,
            asset_id: db.asset_id,
            version: db.version,
        })
    }
}
