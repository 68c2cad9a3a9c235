use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use super::position_ledger;
use super::positions_model::{Holding, Position};
use super::positions_traits::{PositionRepositoryTrait, PositionServiceTrait};
use crate::assets::AssetRepositoryTrait;
use crate::clubs::ClubRepositoryTrait;
use crate::errors::{Error, Result};
use crate::ledger::{retry_on_stale_write, LedgerPosting, LedgerRepositoryTrait};

pub struct PositionService {
    club_repository: Arc<dyn ClubRepositoryTrait>,
    asset_repository: Arc<dyn AssetRepositoryTrait>,
    position_repository: Arc<dyn PositionRepositoryTrait>,
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
}

impl PositionService {
    pub fn new(
        club_repository: Arc<dyn ClubRepositoryTrait>,
        asset_repository: Arc<dyn AssetRepositoryTrait>,
        position_repository: Arc<dyn PositionRepositoryTrait>,
        ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    ) -> Self {
        Self {
            club_repository,
            asset_repository,
            position_repository,
            ledger_repository,
        }
    }

    fn ensure_fund_in_club(&self, club_id: &str, fund_id: &str) -> Result<()> {
        let fund = self.club_repository.get_fund(fund_id)?;
        if fund.club_id != club_id {
            return Err(Error::not_found("Fund", fund_id));
        }
        Ok(())
    }

    async fn try_apply(
        &self,
        fund_id: &str,
        asset_id: &str,
        delta: Decimal,
        price_per_unit: Decimal,
    ) -> Result<Position> {
        let existing = self.position_repository.get_position(fund_id, asset_id)?;
        let change = position_ledger::apply_quantity_change(
            existing.as_ref(),
            fund_id,
            asset_id,
            delta,
            price_per_unit,
            Utc::now(),
        )?;
        let position = change.position.clone();
        let posting = LedgerPosting {
            positions: vec![change],
            ..LedgerPosting::default()
        };
        self.ledger_repository.commit(posting).await?;
        Ok(position)
    }
}

#[async_trait]
impl PositionServiceTrait for PositionService {
    fn get_position(&self, club_id: &str, fund_id: &str, asset_id: &str) -> Result<Position> {
        self.ensure_fund_in_club(club_id, fund_id)?;
        self.position_repository
            .get_position(fund_id, asset_id)?
            .ok_or_else(|| Error::not_found("Position", format!("{}/{}", fund_id, asset_id)))
    }

    fn get_fund_holdings(&self, club_id: &str, fund_id: &str) -> Result<Vec<Holding>> {
        self.ensure_fund_in_club(club_id, fund_id)?;
        let positions: Vec<Position> = self
            .position_repository
            .list_by_fund(fund_id)?
            .into_iter()
            .filter(Position::is_open)
            .collect();
        let asset_ids: Vec<String> = positions.iter().map(|p| p.asset_id.clone()).collect();
        let mut assets: HashMap<String, _> = self
            .asset_repository
            .list_by_asset_ids(&asset_ids)?
            .into_iter()
            .map(|a| (a.id.clone(), a))
            .collect();

        let mut holdings = Vec::with_capacity(positions.len());
        for position in positions {
            let asset = assets
                .remove(&position.asset_id)
                .ok_or_else(|| Error::not_found("Asset", position.asset_id.clone()))?;
            holdings.push(Holding { position, asset });
        }
        holdings.sort_by(|a, b| a.asset.symbol.cmp(&b.asset.symbol));
        Ok(holdings)
    }

    async fn apply_quantity_change(
        &self,
        club_id: &str,
        fund_id: &str,
        asset_id: &str,
        delta: Decimal,
        price_per_unit: Decimal,
    ) -> Result<Position> {
        if price_per_unit < Decimal::ZERO {
            return Err(Error::invalid_input("Price per unit cannot be negative"));
        }
        self.ensure_fund_in_club(club_id, fund_id)?;
        self.asset_repository.get_by_id(asset_id)?;

        let position = retry_on_stale_write("position change", || {
            self.try_apply(fund_id, asset_id, delta, price_per_unit)
        })
        .await?;
        debug!(
            "Position {}/{} now {} @ {}",
            fund_id, asset_id, position.quantity, position.average_cost_basis
        );
        Ok(position)
    }
}
