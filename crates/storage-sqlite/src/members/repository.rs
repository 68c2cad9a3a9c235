use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use clubfolio_core::errors::DatabaseError;
use clubfolio_core::members::{
    ClubMembership, MemberRole, MemberTransaction, MembershipRepositoryTrait, NewMembership,
};
use clubfolio_core::{Error, Result};

use super::model::{MemberTransactionDB, MembershipDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{not_found_as, StorageError};
use crate::schema::{club_memberships, member_transactions};
use crate::utils::{format_timestamp, parse_decimal};

pub struct MembershipRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl MembershipRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        MembershipRepository { pool, writer }
    }
}

fn load_membership(conn: &mut SqliteConnection, membership_id: &str) -> Result<ClubMembership> {
    not_found_as(
        club_memberships::table
            .find(membership_id)
            .select(MembershipDB::as_select())
            .first(conn),
        "Membership",
        membership_id,
    )?
    .try_into()
}

/// Units are TEXT, so the sum is taken in Rust to stay exact.
fn sum_units(rows: Vec<String>) -> Result<Decimal> {
    let mut total = Decimal::ZERO;
    for units in &rows {
        total += parse_decimal(units, "units_transacted")?;
    }
    Ok(total)
}

#[async_trait]
impl MembershipRepositoryTrait for MembershipRepository {
    async fn create(&self, new_membership: NewMembership) -> Result<ClubMembership> {
        let now = format_timestamp(Utc::now());
        let membership_db = MembershipDB {
            id: new_membership
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            club_id: new_membership.club_id,
            user_id: new_membership.user_id,
            role: new_membership.role.as_str().to_string(),
            version: 0,
            created_at: now.clone(),
            updated_at: now,
        };

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<ClubMembership> {
                let inserted = diesel::insert_into(club_memberships::table)
                    .values(&membership_db)
                    .returning(MembershipDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                inserted.try_into()
            })
            .await
    }

    fn get_by_id(&self, membership_id: &str) -> Result<ClubMembership> {
        let mut conn = get_connection(&self.pool)?;
        load_membership(&mut conn, membership_id)
    }

    fn list_by_club(&self, club_id: &str) -> Result<Vec<ClubMembership>> {
        let mut conn = get_connection(&self.pool)?;
        club_memberships::table
            .filter(club_memberships::club_id.eq(club_id))
            .select(MembershipDB::as_select())
            .order(club_memberships::created_at.asc())
            .load(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(ClubMembership::try_from)
            .collect()
    }

    async fn update_role(&self, membership_id: &str, role: MemberRole) -> Result<ClubMembership> {
        let membership_id = membership_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<ClubMembership> {
                let updated = diesel::update(club_memberships::table.find(&membership_id))
                    .set((
                        club_memberships::role.eq(role.as_str()),
                        club_memberships::version.eq(club_memberships::version + 1),
                        club_memberships::updated_at.eq(format_timestamp(Utc::now())),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if updated == 0 {
                    return Err(Error::not_found("Membership", membership_id));
                }
                load_membership(conn, &membership_id)
            })
            .await
    }

    async fn delete(&self, membership_id: &str, expected_version: i64) -> Result<()> {
        let membership_id = membership_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let deleted = diesel::delete(
                    club_memberships::table
                        .filter(club_memberships::id.eq(&membership_id))
                        .filter(club_memberships::version.eq(expected_version)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;

                if deleted == 0 {
                    // Tell a missing row apart from one that moved on.
                    load_membership(conn, &membership_id)?;
                    return Err(DatabaseError::ConcurrentModification(format!(
                        "membership {}",
                        membership_id
                    ))
                    .into());
                }
                Ok(())
            })
            .await
    }

    fn list_member_transactions(&self, membership_id: &str) -> Result<Vec<MemberTransaction>> {
        let mut conn = get_connection(&self.pool)?;
        member_transactions::table
            .filter(member_transactions::membership_id.eq(membership_id))
            .select(MemberTransactionDB::as_select())
            .order((
                member_transactions::transaction_date.asc(),
                member_transactions::created_at.asc(),
            ))
            .load(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(MemberTransaction::try_from)
            .collect()
    }

    fn get_unit_balance(&self, membership_id: &str) -> Result<Decimal> {
        let mut conn = get_connection(&self.pool)?;
        let rows = member_transactions::table
            .filter(member_transactions::membership_id.eq(membership_id))
            .select(member_transactions::units_transacted)
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?;
        sum_units(rows)
    }

    fn get_club_units_outstanding(&self, club_id: &str) -> Result<Decimal> {
        let mut conn = get_connection(&self.pool)?;
        let rows = member_transactions::table
            .filter(member_transactions::club_id.eq(club_id))
            .select(member_transactions::units_transacted)
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?;
        sum_units(rows)
    }
}
