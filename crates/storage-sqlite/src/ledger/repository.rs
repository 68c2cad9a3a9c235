use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::SqliteConnection;
use log::debug;

use clubfolio_core::errors::DatabaseError;
use clubfolio_core::ledger::{
    ClubBalanceChange, FundBalanceChange, LedgerPosting, LedgerRepositoryTrait,
    MemberTransactionChange, PositionChange,
};
use clubfolio_core::{Error, Result};

use crate::db::WriteHandle;
use crate::errors::StorageError;
use crate::members::MemberTransactionDB;
use crate::positions::PositionDB;
use crate::schema::{club_memberships, clubs, funds, member_transactions, positions, transactions};
use crate::transactions::TransactionDB;
use crate::utils::{format_decimal, format_timestamp};

/// Applies ledger postings through the writer actor.
///
/// The whole posting runs inside the writer's immediate transaction, so an
/// error at any step rolls back every row written before it.
pub struct LedgerRepository {
    writer: WriteHandle,
}

impl LedgerRepository {
    pub fn new(writer: WriteHandle) -> Self {
        LedgerRepository { writer }
    }
}

fn stale(what: String) -> Error {
    DatabaseError::ConcurrentModification(what).into()
}

/// Zero rows matched a versioned update: the row is either gone or moved on.
fn missing_or_stale<T>(
    exists: std::result::Result<Option<T>, DieselError>,
    entity: &'static str,
    id: &str,
) -> Result<()> {
    match exists.map_err(StorageError::from)? {
        None => Err(Error::not_found(entity, id)),
        Some(_) => Err(stale(format!("{} {}", entity, id))),
    }
}

fn apply_club_balance(conn: &mut SqliteConnection, change: &ClubBalanceChange) -> Result<()> {
    let updated = diesel::update(
        clubs::table
            .filter(clubs::id.eq(&change.club_id))
            .filter(clubs::version.eq(change.expected_version)),
    )
    .set((
        clubs::bank_account_balance.eq(format_decimal(change.new_balance)),
        clubs::version.eq(change.expected_version + 1),
        clubs::updated_at.eq(format_timestamp(Utc::now())),
    ))
    .execute(conn)
    .map_err(StorageError::from)?;

    if updated == 0 {
        let exists = clubs::table
            .find(&change.club_id)
            .select(clubs::id)
            .first::<String>(conn)
            .optional();
        return missing_or_stale(exists, "Club", &change.club_id);
    }
    Ok(())
}

fn apply_fund_balance(conn: &mut SqliteConnection, change: &FundBalanceChange) -> Result<()> {
    let updated = diesel::update(
        funds::table
            .filter(funds::id.eq(&change.fund_id))
            .filter(funds::version.eq(change.expected_version)),
    )
    .set((
        funds::brokerage_cash_balance.eq(format_decimal(change.new_balance)),
        funds::version.eq(change.expected_version + 1),
        funds::updated_at.eq(format_timestamp(Utc::now())),
    ))
    .execute(conn)
    .map_err(StorageError::from)?;

    if updated == 0 {
        let exists = funds::table
            .find(&change.fund_id)
            .select(funds::id)
            .first::<String>(conn)
            .optional();
        return missing_or_stale(exists, "Fund", &change.fund_id);
    }
    Ok(())
}

fn apply_position(conn: &mut SqliteConnection, change: &PositionChange) -> Result<()> {
    let row = PositionDB::from(&change.position);
    match change.expected_version {
        None => {
            // Another writer opened the same (fund, asset) first.
            match diesel::insert_into(positions::table).values(&row).execute(conn) {
                Ok(_) => Ok(()),
                Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                    Err(stale(format!("position {}/{}", row.fund_id, row.asset_id)))
                }
                Err(e) => Err(StorageError::from(e).into()),
            }
        }
        Some(expected) => {
            let updated = diesel::update(
                positions::table
                    .filter(positions::id.eq(&row.id))
                    .filter(positions::version.eq(expected)),
            )
            .set((
                positions::quantity.eq(&row.quantity),
                positions::average_cost_basis.eq(&row.average_cost_basis),
                positions::version.eq(row.version),
                positions::updated_at.eq(&row.updated_at),
            ))
            .execute(conn)
            .map_err(StorageError::from)?;
            if updated == 0 {
                return Err(stale(format!("position {}", row.id)));
            }
            Ok(())
        }
    }
}

fn apply_member_transaction(
    conn: &mut SqliteConnection,
    change: &MemberTransactionChange,
) -> Result<()> {
    let membership_id = &change.transaction.membership_id;
    let updated = diesel::update(
        club_memberships::table
            .filter(club_memberships::id.eq(membership_id))
            .filter(club_memberships::version.eq(change.membership_expected_version)),
    )
    .set((
        club_memberships::version.eq(change.membership_expected_version + 1),
        club_memberships::updated_at.eq(format_timestamp(Utc::now())),
    ))
    .execute(conn)
    .map_err(StorageError::from)?;

    if updated == 0 {
        let exists = club_memberships::table
            .find(membership_id)
            .select(club_memberships::id)
            .first::<String>(conn)
            .optional();
        return missing_or_stale(exists, "Membership", membership_id);
    }

    diesel::insert_into(member_transactions::table)
        .values(&MemberTransactionDB::from(&change.transaction))
        .execute(conn)
        .map_err(StorageError::from)?;
    Ok(())
}

fn apply_posting(conn: &mut SqliteConnection, posting: &LedgerPosting) -> Result<()> {
    if let Some(change) = &posting.club_balance {
        apply_club_balance(conn, change)?;
    }
    for change in &posting.fund_balances {
        apply_fund_balance(conn, change)?;
    }
    for change in &posting.positions {
        apply_position(conn, change)?;
    }
    // In order: linked rows reference rows inserted before them.
    for transaction in &posting.transactions {
        diesel::insert_into(transactions::table)
            .values(&TransactionDB::from(transaction))
            .execute(conn)
            .map_err(StorageError::from)?;
    }
    if let Some(change) = &posting.member_transaction {
        apply_member_transaction(conn, change)?;
    }
    Ok(())
}

#[async_trait]
impl LedgerRepositoryTrait for LedgerRepository {
    async fn commit(&self, posting: LedgerPosting) -> Result<()> {
        if posting.is_empty() {
            return Ok(());
        }
        debug!(
            "Committing posting: {} fund balance(s), {} position(s), {} transaction(s)",
            posting.fund_balances.len(),
            posting.positions.len(),
            posting.transactions.len()
        );
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> { apply_posting(conn, &posting) })
            .await
    }
}
