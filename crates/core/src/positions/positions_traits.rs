use async_trait::async_trait;
use rust_decimal::Decimal;

use super::positions_model::{Holding, Position};
use crate::errors::Result;

/// Read access to positions. Writes go through ledger postings.
pub trait PositionRepositoryTrait: Send + Sync {
    fn get_position(&self, fund_id: &str, asset_id: &str) -> Result<Option<Position>>;

    fn list_by_fund(&self, fund_id: &str) -> Result<Vec<Position>>;

    /// Lists positions of several funds in one query.
    fn list_by_funds(&self, fund_ids: &[String]) -> Result<Vec<Position>>;
}

#[async_trait]
pub trait PositionServiceTrait: Send + Sync {
    fn get_position(&self, club_id: &str, fund_id: &str, asset_id: &str) -> Result<Position>;

    /// Open positions of a fund with their assets, sorted by symbol.
    fn get_fund_holdings(&self, club_id: &str, fund_id: &str) -> Result<Vec<Holding>>;

    /// Applies a standalone quantity change to one position and persists it.
    ///
    /// Cash balances are not touched; trades go through the transaction
    /// processor instead.
    async fn apply_quantity_change(
        &self,
        club_id: &str,
        fund_id: &str,
        asset_id: &str,
        delta: Decimal,
        price_per_unit: Decimal,
    ) -> Result<Position>;
}
