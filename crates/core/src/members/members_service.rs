use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use super::members_model::{
    ClubMembership, MemberCashMovement, MemberEquity, MemberRole, MemberTransaction,
    MemberTransactionType, NewMembership,
};
use super::members_traits::{MemberServiceTrait, MembershipRepositoryTrait};
use super::unit_calculator::{deposit_unit_value, equity_value, is_zero_balance, units_for_amount};
use crate::clubs::ClubRepositoryTrait;
use crate::config::LedgerConfig;
use crate::errors::{Error, LedgerError, Result};
use crate::ledger::{
    retry_on_stale_write, LedgerBook, LedgerRepositoryTrait, MemberTransactionChange,
};
use crate::nav::UnitValueRepositoryTrait;

/// Service for memberships and unit issuance.
pub struct MemberService {
    club_repository: Arc<dyn ClubRepositoryTrait>,
    membership_repository: Arc<dyn MembershipRepositoryTrait>,
    unit_value_repository: Arc<dyn UnitValueRepositoryTrait>,
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    config: LedgerConfig,
}

impl MemberService {
    pub fn new(
        club_repository: Arc<dyn ClubRepositoryTrait>,
        membership_repository: Arc<dyn MembershipRepositoryTrait>,
        unit_value_repository: Arc<dyn UnitValueRepositoryTrait>,
        ledger_repository: Arc<dyn LedgerRepositoryTrait>,
        config: LedgerConfig,
    ) -> Self {
        Self {
            club_repository,
            membership_repository,
            unit_value_repository,
            ledger_repository,
            config,
        }
    }

    async fn try_deposit(&self, movement: &MemberCashMovement) -> Result<MemberTransaction> {
        let membership = self.get_membership(&movement.club_id, &movement.membership_id)?;
        let club = self.club_repository.get_club(&movement.club_id)?;
        let latest = self.unit_value_repository.get_latest(&club.id)?;
        let unit_value = deposit_unit_value(latest.as_ref(), self.config.bootstrap_unit_value)?;
        let units = units_for_amount(movement.amount, unit_value)?;

        let mut book = LedgerBook::new(club, Vec::new(), Vec::new(), Utc::now());
        book.credit_bank(movement.amount);
        self.commit(
            book,
            &membership,
            movement,
            MemberTransactionType::Deposit,
            unit_value,
            units,
        )
        .await
    }

    async fn try_withdraw(&self, movement: &MemberCashMovement) -> Result<MemberTransaction> {
        let membership = self.get_membership(&movement.club_id, &movement.membership_id)?;
        let club = self.club_repository.get_club(&movement.club_id)?;
        let latest = self
            .unit_value_repository
            .get_latest(&club.id)?
            .ok_or_else(|| {
                LedgerError::PreconditionFailed(format!(
                    "club {} has no unit valuation yet, withdrawals need one",
                    club.id
                ))
            })?;
        let units = units_for_amount(movement.amount, latest.unit_value)?;

        let held = self
            .membership_repository
            .get_unit_balance(&membership.id)?;
        if held < units {
            return Err(LedgerError::InsufficientUnits {
                membership_id: membership.id.clone(),
                held,
                requested: units,
            }
            .into());
        }

        let mut book = LedgerBook::new(club, Vec::new(), Vec::new(), Utc::now());
        book.debit_bank(movement.amount)?;
        self.commit(
            book,
            &membership,
            movement,
            MemberTransactionType::Withdrawal,
            latest.unit_value,
            -units,
        )
        .await
    }

    async fn commit(
        &self,
        book: LedgerBook,
        membership: &ClubMembership,
        movement: &MemberCashMovement,
        transaction_type: MemberTransactionType,
        unit_value_used: Decimal,
        units_transacted: Decimal,
    ) -> Result<MemberTransaction> {
        let transaction = MemberTransaction {
            id: Uuid::new_v4().to_string(),
            membership_id: membership.id.clone(),
            club_id: membership.club_id.clone(),
            transaction_type,
            transaction_date: movement.transaction_date,
            amount: movement.amount,
            unit_value_used,
            units_transacted,
            created_at: book.now(),
        };
        let mut posting = book.into_posting();
        posting.member_transaction = Some(MemberTransactionChange {
            transaction: transaction.clone(),
            membership_expected_version: membership.version,
        });
        self.ledger_repository.commit(posting).await?;
        Ok(transaction)
    }

    async fn try_remove(&self, club_id: &str, membership_id: &str) -> Result<()> {
        let membership = self.get_membership(club_id, membership_id)?;
        let units = self
            .membership_repository
            .get_unit_balance(&membership.id)?;
        if !is_zero_balance(units) {
            return Err(LedgerError::PreconditionFailed(format!(
                "membership {} still holds {} units",
                membership.id, units
            ))
            .into());
        }
        self.membership_repository
            .delete(&membership.id, membership.version)
            .await
    }
}

#[async_trait]
impl MemberServiceTrait for MemberService {
    async fn add_member(&self, new_membership: NewMembership) -> Result<ClubMembership> {
        new_membership.validate()?;
        self.club_repository.get_club(&new_membership.club_id)?;
        let membership = self.membership_repository.create(new_membership).await?;
        info!(
            "Added user {} to club {} as {}",
            membership.user_id,
            membership.club_id,
            membership.role.as_str()
        );
        Ok(membership)
    }

    fn get_membership(&self, club_id: &str, membership_id: &str) -> Result<ClubMembership> {
        let membership = self.membership_repository.get_by_id(membership_id)?;
        if membership.club_id != club_id {
            return Err(Error::not_found("Membership", membership_id));
        }
        Ok(membership)
    }

    fn list_memberships(&self, club_id: &str) -> Result<Vec<ClubMembership>> {
        self.club_repository.get_club(club_id)?;
        self.membership_repository.list_by_club(club_id)
    }

    async fn update_role(
        &self,
        club_id: &str,
        membership_id: &str,
        role: MemberRole,
    ) -> Result<ClubMembership> {
        self.get_membership(club_id, membership_id)?;
        self.membership_repository
            .update_role(membership_id, role)
            .await
    }

    async fn remove_member(&self, club_id: &str, membership_id: &str) -> Result<()> {
        retry_on_stale_write("member removal", || self.try_remove(club_id, membership_id)).await?;
        info!("Removed membership {} from club {}", membership_id, club_id);
        Ok(())
    }

    async fn deposit(&self, movement: MemberCashMovement) -> Result<MemberTransaction> {
        movement.validate()?;
        let transaction = retry_on_stale_write("deposit", || self.try_deposit(&movement)).await?;
        info!(
            "Deposit of {} by membership {} issued {} units at {}",
            transaction.amount,
            transaction.membership_id,
            transaction.units_transacted,
            transaction.unit_value_used
        );
        Ok(transaction)
    }

    async fn withdraw(&self, movement: MemberCashMovement) -> Result<MemberTransaction> {
        movement.validate()?;
        let transaction = retry_on_stale_write("withdrawal", || self.try_withdraw(&movement)).await?;
        info!(
            "Withdrawal of {} by membership {} redeemed {} units at {}",
            transaction.amount,
            transaction.membership_id,
            -transaction.units_transacted,
            transaction.unit_value_used
        );
        Ok(transaction)
    }

    fn list_member_transactions(
        &self,
        club_id: &str,
        membership_id: &str,
    ) -> Result<Vec<MemberTransaction>> {
        self.get_membership(club_id, membership_id)?;
        self.membership_repository
            .list_member_transactions(membership_id)
    }

    fn get_member_units(&self, club_id: &str, membership_id: &str) -> Result<Decimal> {
        self.get_membership(club_id, membership_id)?;
        self.membership_repository.get_unit_balance(membership_id)
    }

    fn get_member_equity(&self, club_id: &str, membership_id: &str) -> Result<MemberEquity> {
        let units = self.get_member_units(club_id, membership_id)?;
        let latest = self.unit_value_repository.get_latest(club_id)?;
        let (unit_value, valuation_date) = latest
            .map(|s| (s.unit_value, Some(s.valuation_date)))
            .unwrap_or((Decimal::ZERO, None));
        if valuation_date.is_none() {
            debug!("Club {} has no valuation, equity is zero", club_id);
        }
        Ok(MemberEquity {
            membership_id: membership_id.to_string(),
            units,
            unit_value,
            valuation_date,
            equity: equity_value(units, unit_value),
        })
    }
}
