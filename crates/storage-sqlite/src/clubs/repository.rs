use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use clubfolio_core::clubs::{Club, ClubRepositoryTrait, Fund, FundSplit, NewClub, NewFund};
use clubfolio_core::Result;

use super::model::{ClubDB, FundDB, FundSplitDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{not_found_as, StorageError};
use crate::schema::{clubs, fund_splits, funds};
use crate::utils::{format_decimal, format_timestamp};

pub struct ClubRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ClubRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        ClubRepository { pool, writer }
    }
}

fn load_fund(conn: &mut SqliteConnection, fund_id: &str) -> Result<Fund> {
    not_found_as(
        funds::table
            .find(fund_id)
            .select(FundDB::as_select())
            .first(conn),
        "Fund",
        fund_id,
    )?
    .try_into()
}

#[async_trait]
impl ClubRepositoryTrait for ClubRepository {
    async fn create_club(&self, new_club: NewClub) -> Result<Club> {
        let now = format_timestamp(Utc::now());
        let club_db = ClubDB {
            id: new_club.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: new_club.name,
            bank_account_balance: format_decimal(Decimal::ZERO),
            version: 0,
            created_at: now.clone(),
            updated_at: now,
        };

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Club> {
                let inserted = diesel::insert_into(clubs::table)
                    .values(&club_db)
                    .returning(ClubDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                inserted.try_into()
            })
            .await
    }

    fn get_club(&self, club_id: &str) -> Result<Club> {
        let mut conn = get_connection(&self.pool)?;
        not_found_as(
            clubs::table
                .find(club_id)
                .select(ClubDB::as_select())
                .first(&mut conn),
            "Club",
            club_id,
        )?
        .try_into()
    }

    fn list_clubs(&self) -> Result<Vec<Club>> {
        let mut conn = get_connection(&self.pool)?;
        clubs::table
            .select(ClubDB::as_select())
            .order(clubs::name.asc())
            .load(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(Club::try_from)
            .collect()
    }

    async fn create_fund(&self, new_fund: NewFund) -> Result<Fund> {
        let now = format_timestamp(Utc::now());
        let fund_db = FundDB {
            id: new_fund.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            club_id: new_fund.club_id,
            name: new_fund.name,
            brokerage_cash_balance: format_decimal(Decimal::ZERO),
            is_active: true,
            version: 0,
            created_at: now.clone(),
            updated_at: now,
        };

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Fund> {
                let inserted = diesel::insert_into(funds::table)
                    .values(&fund_db)
                    .returning(FundDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                inserted.try_into()
            })
            .await
    }

    fn get_fund(&self, fund_id: &str) -> Result<Fund> {
        let mut conn = get_connection(&self.pool)?;
        load_fund(&mut conn, fund_id)
    }

    fn list_funds(&self, club_id: &str) -> Result<Vec<Fund>> {
        let mut conn = get_connection(&self.pool)?;
        funds::table
            .filter(funds::club_id.eq(club_id))
            .select(FundDB::as_select())
            .order((funds::created_at.asc(), funds::name.asc()))
            .load(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(Fund::try_from)
            .collect()
    }

    // Leaves `version` alone: it only guards the cash balance.
    async fn set_fund_active(&self, fund_id: &str, is_active: bool) -> Result<Fund> {
        let fund_id = fund_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Fund> {
                diesel::update(funds::table.find(&fund_id))
                    .set((
                        funds::is_active.eq(is_active),
                        funds::updated_at.eq(format_timestamp(Utc::now())),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                load_fund(conn, &fund_id)
            })
            .await
    }

    async fn replace_fund_splits(
        &self,
        club_id: &str,
        splits: Vec<FundSplit>,
    ) -> Result<Vec<FundSplit>> {
        let club_id = club_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Vec<FundSplit>> {
                diesel::delete(fund_splits::table.filter(fund_splits::club_id.eq(&club_id)))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let rows: Vec<FundSplitDB> = splits
                    .iter()
                    .enumerate()
                    .map(|(index, split)| FundSplitDB::from_domain(split, index as i32))
                    .collect();
                if !rows.is_empty() {
                    diesel::insert_into(fund_splits::table)
                        .values(&rows)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(splits)
            })
            .await
    }

    fn list_fund_splits(&self, club_id: &str) -> Result<Vec<FundSplit>> {
        let mut conn = get_connection(&self.pool)?;
        fund_splits::table
            .filter(fund_splits::club_id.eq(club_id))
            .select(FundSplitDB::as_select())
            .order(fund_splits::sort_order.asc())
            .load(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(FundSplit::try_from)
            .collect()
    }
}
