//! Database models for clubs, funds and fund splits.

use diesel::prelude::*;

use crate::utils::{format_decimal, parse_decimal, parse_timestamp};
use clubfolio_core::clubs::{Club, Fund, FundSplit};
use clubfolio_core::Error;

/// Database model for clubs
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::clubs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ClubDB {
    pub id: String,
    pub name: String,
    pub bank_account_balance: String,
    pub version: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Database model for funds
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::funds)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FundDB {
    pub id: String,
    pub club_id: String,
    pub name: String,
    pub brokerage_cash_balance: String,
    pub is_active: bool,
    pub version: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Database model for fund splits. `sort_order` keeps the configured order,
/// which decides who absorbs the rounding remainder.
#[derive(Queryable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::fund_splits)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FundSplitDB {
    pub club_id: String,
    pub fund_id: String,
    pub split_percentage: String,
    pub sort_order: i32,
}

impl TryFrom<ClubDB> for Club {
    type Error = Error;

    fn try_from(db: ClubDB) -> Result<Self, Self::Error> {
        Ok(Self {
            bank_account_balance: parse_decimal(&db.bank_account_balance, "bank_account_balance")?,
            created_at: parse_timestamp(&db.created_at, "created_at")?,
            updated_at: parse_timestamp(&db.updated_at, "updated_at")?,
            id: db.id,
            name: db.name,
            version: db.version,
        })
    }
}

impl TryFrom<FundDB> for Fund {
    type Error = Error;

    fn try_from(db: FundDB) -> Result<Self, Self::Error> {
        Ok(Self {
            brokerage_cash_balance: parse_decimal(
                &db.brokerage_cash_balance,
                "brokerage_cash_balance",
            )?,
            created_at: parse_timestamp(&db.created_at, "created_at")?,
            updated_at: parse_timestamp(&db.updated_at, "updated_at")?,
            id: db.id,
            club_id: db.club_id,
            name: db.name,
            is_active: db.is_active,
            version: db.version,
        })
    }
}

impl TryFrom<FundSplitDB> for FundSplit {
    type Error = Error;

    fn try_from(db: FundSplitDB) -> Result<Self, Self::Error> {
        Ok(Self {
            split_percentage: parse_decimal(&db.split_percentage, "split_percentage")?,
            club_id: db.club_id,
            fund_id: db.fund_id,
        })
    }
}

impl FundSplitDB {
    pub fn from_domain(split: &FundSplit, sort_order: i32) -> Self {
        Self {
            club_id: split.club_id.clone(),
            fund_id: split.fund_id.clone(),
            split_percentage: format_decimal(split.split_percentage),
            sort_order,
        }
    }
}
