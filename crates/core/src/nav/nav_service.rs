use async_trait::async_trait;
use chrono::NaiveDate;
use log::{info, warn};
use std::collections::BTreeSet;
use std::sync::Arc;

use super::nav_calculator::calculate_nav;
use super::nav_model::{NavCalculation, UnitValueHistory};
use super::nav_traits::{NavServiceTrait, UnitValueRepositoryTrait};
use crate::clubs::ClubRepositoryTrait;
use crate::config::LedgerConfig;
use crate::errors::{Error, Result};
use crate::market_data::{fetch_prices, MarketPriceProviderTrait};

/// Computes and stores club valuations.
pub struct NavService {
    club_repository: Arc<dyn ClubRepositoryTrait>,
    unit_value_repository: Arc<dyn UnitValueRepositoryTrait>,
    price_provider: Arc<dyn MarketPriceProviderTrait>,
    config: LedgerConfig,
}

impl NavService {
    pub fn new(
        club_repository: Arc<dyn ClubRepositoryTrait>,
        unit_value_repository: Arc<dyn UnitValueRepositoryTrait>,
        price_provider: Arc<dyn MarketPriceProviderTrait>,
        config: LedgerConfig,
    ) -> Self {
        Self {
            club_repository,
            unit_value_repository,
            price_provider,
            config,
        }
    }
}

#[async_trait]
impl NavServiceTrait for NavService {
    async fn preview_nav(
        &self,
        club_id: &str,
        valuation_date: NaiveDate,
    ) -> Result<NavCalculation> {
        let state = self.unit_value_repository.load_valuation_state(club_id)?;
        let positions: Vec<_> = state
            .positions
            .into_iter()
            .filter(|p| p.is_open())
            .collect();

        let asset_ids: Vec<String> = positions
            .iter()
            .map(|p| p.asset_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let prices = fetch_prices(
            self.price_provider.as_ref(),
            &asset_ids,
            valuation_date,
            self.config.price_lookup_timeout,
        )
        .await?;

        let nav = calculate_nav(
            &state.club,
            &state.funds,
            &positions,
            &prices,
            state.total_units_outstanding,
            valuation_date,
        );

        info!(
            "NAV for club {} on {}: market value {}, cash {} (bank {}, brokerage {}), total {}, units {}, unit value {}",
            nav.club_id,
            nav.valuation_date,
            nav.market_value,
            nav.total_cash,
            nav.bank_cash,
            nav.brokerage_cash,
            nav.total_club_value,
            nav.total_units_outstanding,
            nav.unit_value
        );
        if !nav.unpriced_asset_ids.is_empty() {
            warn!(
                "NAV for club {} on {} values {} asset(s) at 0: {}",
                nav.club_id,
                nav.valuation_date,
                nav.unpriced_asset_ids.len(),
                nav.unpriced_asset_ids.join(", ")
            );
        }
        if nav.total_units_outstanding.is_zero() && !nav.total_club_value.is_zero() {
            warn!(
                "Club {} is worth {} with no units outstanding; unit value is 0",
                nav.club_id, nav.total_club_value
            );
        }
        Ok(nav)
    }

    async fn calculate_and_store_nav(
        &self,
        club_id: &str,
        valuation_date: NaiveDate,
    ) -> Result<UnitValueHistory> {
        let nav = self.preview_nav(club_id, valuation_date).await?;
        let snapshot = self
            .unit_value_repository
            .create(nav.to_new_unit_value())
            .await?;
        info!(
            "Stored unit value {} for club {} on {}",
            snapshot.unit_value, snapshot.club_id, snapshot.valuation_date
        );
        Ok(snapshot)
    }

    fn get_latest_unit_value(&self, club_id: &str) -> Result<UnitValueHistory> {
        self.club_repository.get_club(club_id)?;
        self.unit_value_repository
            .get_latest(club_id)?
            .ok_or_else(|| Error::not_found("Unit value", club_id))
    }

    fn get_unit_value_on(
        &self,
        club_id: &str,
        valuation_date: NaiveDate,
    ) -> Result<UnitValueHistory> {
        self.club_repository.get_club(club_id)?;
        self.unit_value_repository
            .get_on_date(club_id, valuation_date)?
            .ok_or_else(|| Error::not_found("Unit value", format!("{}@{}", club_id, valuation_date)))
    }

    fn list_unit_value_history(
        &self,
        club_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<UnitValueHistory>> {
        self.club_repository.get_club(club_id)?;
        self.unit_value_repository.list(club_id, from, to)
    }
}
