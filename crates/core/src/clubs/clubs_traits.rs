//! Club repository and service traits.

use async_trait::async_trait;

use super::clubs_model::{Club, Fund, FundSplit, NewClub, NewFund, NewFundSplit};
use crate::errors::Result;

/// Persistence contract for clubs, funds and fund splits.
///
/// Balances are never written here: they only change through
/// [`crate::ledger::LedgerRepositoryTrait::commit`].
#[async_trait]
pub trait ClubRepositoryTrait: Send + Sync {
    async fn create_club(&self, new_club: NewClub) -> Result<Club>;

    fn get_club(&self, club_id: &str) -> Result<Club>;

    fn list_clubs(&self) -> Result<Vec<Club>>;

    async fn create_fund(&self, new_fund: NewFund) -> Result<Fund>;

    fn get_fund(&self, fund_id: &str) -> Result<Fund>;

    /// Lists every fund of a club, active or not.
    fn list_funds(&self, club_id: &str) -> Result<Vec<Fund>>;

    async fn set_fund_active(&self, fund_id: &str, is_active: bool) -> Result<Fund>;

    /// Replaces the club's split set in one write. Order is preserved.
    async fn replace_fund_splits(
        &self,
        club_id: &str,
        splits: Vec<FundSplit>,
    ) -> Result<Vec<FundSplit>>;

    /// Returns the club's splits in configured order.
    fn list_fund_splits(&self, club_id: &str) -> Result<Vec<FundSplit>>;
}

/// Club administration operations.
#[async_trait]
pub trait ClubServiceTrait: Send + Sync {
    async fn create_club(&self, new_club: NewClub) -> Result<Club>;

    fn get_club(&self, club_id: &str) -> Result<Club>;

    fn list_clubs(&self) -> Result<Vec<Club>>;

    async fn create_fund(&self, new_fund: NewFund) -> Result<Fund>;

    /// Returns the fund only if it belongs to `club_id`.
    fn get_fund(&self, club_id: &str, fund_id: &str) -> Result<Fund>;

    fn list_funds(&self, club_id: &str) -> Result<Vec<Fund>>;

    async fn set_fund_active(&self, club_id: &str, fund_id: &str, is_active: bool)
        -> Result<Fund>;

    /// Validates and replaces the club's fund split configuration.
    async fn set_fund_splits(
        &self,
        club_id: &str,
        splits: Vec<NewFundSplit>,
    ) -> Result<Vec<FundSplit>>;

    fn get_fund_splits(&self, club_id: &str) -> Result<Vec<FundSplit>>;
}
