use async_trait::async_trait;
use rust_decimal::Decimal;

use super::members_model::{
    ClubMembership, MemberCashMovement, MemberEquity, MemberRole, MemberTransaction,
    NewMembership,
};
use crate::errors::Result;

/// Persistence contract for memberships and their unit ledger.
///
/// Member transactions are inserted through ledger postings only.
#[async_trait]
pub trait MembershipRepositoryTrait: Send + Sync {
    /// Fails with a unique violation when the user already belongs to the club.
    async fn create(&self, new_membership: NewMembership) -> Result<ClubMembership>;

    fn get_by_id(&self, membership_id: &str) -> Result<ClubMembership>;

    fn list_by_club(&self, club_id: &str) -> Result<Vec<ClubMembership>>;

    async fn update_role(&self, membership_id: &str, role: MemberRole) -> Result<ClubMembership>;

    /// Deletes the membership if it is still at `expected_version`.
    async fn delete(&self, membership_id: &str, expected_version: i64) -> Result<()>;

    /// Oldest first.
    fn list_member_transactions(&self, membership_id: &str) -> Result<Vec<MemberTransaction>>;

    /// Sum of the membership's `units_transacted`.
    fn get_unit_balance(&self, membership_id: &str) -> Result<Decimal>;

    /// Sum of `units_transacted` over every membership of the club.
    fn get_club_units_outstanding(&self, club_id: &str) -> Result<Decimal>;
}

#[async_trait]
pub trait MemberServiceTrait: Send + Sync {
    async fn add_member(&self, new_membership: NewMembership) -> Result<ClubMembership>;

    fn get_membership(&self, club_id: &str, membership_id: &str) -> Result<ClubMembership>;

    fn list_memberships(&self, club_id: &str) -> Result<Vec<ClubMembership>>;

    async fn update_role(
        &self,
        club_id: &str,
        membership_id: &str,
        role: MemberRole,
    ) -> Result<ClubMembership>;

    /// Removes a membership whose unit balance is zero.
    async fn remove_member(&self, club_id: &str, membership_id: &str) -> Result<()>;

    /// Issues units for cash paid into the club bank account.
    async fn deposit(&self, movement: MemberCashMovement) -> Result<MemberTransaction>;

    /// Redeems units for cash paid out of the club bank account.
    async fn withdraw(&self, movement: MemberCashMovement) -> Result<MemberTransaction>;

    fn list_member_transactions(
        &self,
        club_id: &str,
        membership_id: &str,
    ) -> Result<Vec<MemberTransaction>>;

    fn get_member_units(&self, club_id: &str, membership_id: &str) -> Result<Decimal>;

    /// Never fails for lack of a valuation; equity is zero then.
    fn get_member_equity(&self, club_id: &str, membership_id: &str) -> Result<MemberEquity>;
}
