//! Database models for memberships and member transactions.

use diesel::prelude::*;

use crate::utils::{
    format_date, format_decimal, format_timestamp, parse_code, parse_date, parse_decimal,
    parse_timestamp,
};
use clubfolio_core::members::{ClubMembership, MemberTransaction};
use clubfolio_core::Error;

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::club_memberships)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MembershipDB {
    pub id: String,
    pub club_id: String,
    pub user_id: String,
    pub role: String,
    pub version: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Database model for member deposits and withdrawals. Rows are insert-only
/// and go away with their membership.
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::member_transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MemberTransactionDB {
    pub id: String,
    pub membership_id: String,
    pub club_id: String,
    pub transaction_type: String,
    pub transaction_date: String,
    pub amount: String,
    pub unit_value_used: String,
    pub units_transacted: String,
    pub created_at: String,
}

impl TryFrom<MembershipDB> for ClubMembership {
    type Error = Error;

    fn try_from(db: MembershipDB) -> Result<Self, Self::Error> {
        Ok(Self {
            role: parse_code(&db.role, "role")?,
            created_at: parse_timestamp(&db.created_at, "created_at")?,
            updated_at: parse_timestamp(&db.updated_at, "updated_at")?,
            id: db.id,
            club_id: db.club_id,
            user_id: db.user_id,
            version: db.version,
        })
    }
}

impl From<&MemberTransaction> for MemberTransactionDB {
    fn from(tx: &MemberTransaction) -> Self {
        Self {
            id: tx.id.clone(),
            membership_id: tx.membership_id.clone(),
            club_id: tx.club_id.clone(),
            transaction_type: tx.transaction_type.as_str().to_string(),
            transaction_date: format_date(tx.transaction_date),
            amount: format_decimal(tx.amount),
            unit_value_used: format_decimal(tx.unit_value_used),
            units_transacted: format_decimal(tx.units_transacted),
            created_at: format_timestamp(tx.created_at),
        }
    }
}

impl TryFrom<MemberTransactionDB> for MemberTransaction {
    type Error = Error;

    fn try_from(db: MemberTransactionDB) -> Result<Self, Self::Error> {
        Ok(Self {
            transaction_type: parse_code(&db.transaction_type, "transaction_type")?,
            transaction_date: parse_date(&db.transaction_date, "transaction_date")?,
            amount: parse_decimal(&db.amount, "amount")?,
            unit_value_used: parse_decimal(&db.unit_value_used, "unit_value_used")?,
            units_transacted: parse_decimal(&db.units_transacted, "units_transacted")?,
            created_at: parse_timestamp(&db.created_at, "created_at")?,
            id: db.id,
            membership_id: db.membership_id,
            club_id: db.club_id,
        })
    }
}
