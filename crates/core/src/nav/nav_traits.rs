use async_trait::async_trait;
use chrono::NaiveDate;

use super::nav_model::{NavCalculation, NewUnitValue, UnitValueHistory, ValuationState};
use crate::errors::Result;

/// Persistence contract for unit value snapshots.
#[async_trait]
pub trait UnitValueRepositoryTrait: Send + Sync {
    /// Fails with a unique violation if the club already has a snapshot on that date.
    async fn create(&self, new_unit_value: NewUnitValue) -> Result<UnitValueHistory>;

    /// Reads the club, its funds, their positions and the units outstanding
    /// in one read transaction, so no commit can land between the reads.
    fn load_valuation_state(&self, club_id: &str) -> Result<ValuationState>;

    /// Snapshot with the greatest valuation date.
    fn get_latest(&self, club_id: &str) -> Result<Option<UnitValueHistory>>;

    fn get_on_date(&self, club_id: &str, valuation_date: NaiveDate)
        -> Result<Option<UnitValueHistory>>;

    /// Snapshots in the inclusive range, oldest first.
    fn list(
        &self,
        club_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<UnitValueHistory>>;
}

#[async_trait]
pub trait NavServiceTrait: Send + Sync {
    /// Values the club without storing anything.
    async fn preview_nav(&self, club_id: &str, valuation_date: NaiveDate)
        -> Result<NavCalculation>;

    /// Values the club and stores the snapshot. A second call for the same
    /// date fails with a conflict.
    async fn calculate_and_store_nav(
        &self,
        club_id: &str,
        valuation_date: NaiveDate,
    ) -> Result<UnitValueHistory>;

    fn get_latest_unit_value(&self, club_id: &str) -> Result<UnitValueHistory>;

    fn get_unit_value_on(&self, club_id: &str, valuation_date: NaiveDate)
        -> Result<UnitValueHistory>;

    fn list_unit_value_history(
        &self,
        club_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<UnitValueHistory>>;
}
