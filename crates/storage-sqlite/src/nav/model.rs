//! Database model for unit value snapshots.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::utils::{
    format_date, format_decimal, format_timestamp, parse_date, parse_decimal, parse_timestamp,
};
use clubfolio_core::nav::{NewUnitValue, UnitValueHistory};
use clubfolio_core::Error;

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::unit_value_history)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UnitValueDB {
    pub id: String,
    pub club_id: String,
    pub valuation_date: String,
    pub total_club_value: String,
    pub total_units_outstanding: String,
    pub unit_value: String,
    pub created_at: String,
}

impl UnitValueDB {
    pub fn from_new(id: String, new: &NewUnitValue, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            club_id: new.club_id.clone(),
            valuation_date: format_date(new.valuation_date),
            total_club_value: format_decimal(new.total_club_value),
            total_units_outstanding: format_decimal(new.total_units_outstanding),
            unit_value: format_decimal(new.unit_value),
            created_at: format_timestamp(created_at),
        }
    }
}

impl TryFrom<UnitValueDB> for UnitValueHistory {
    type Error = Error;

    fn try_from(db: UnitValueDB) -> Result<Self, Self::Error> {
        Ok(Self {
            valuation_date: parse_date(&db.valuation_date, "valuation_date")?,
            total_club_value: parse_decimal(&db.total_club_value, "total_club_value")?,
            total_units_outstanding: parse_decimal(
                &db.total_units_outstanding,
                "total_units_outstanding",
            )?,
            unit_value: parse_decimal(&db.unit_value, "unit_value")?,
            created_at: parse_timestamp(&db.created_at, "created_at")?,
            id: db.id,
            club_id: db.club_id,
        })
    }
}
