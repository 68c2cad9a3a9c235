use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::clubs::{Club, Fund};
use crate::positions::Position;

/// A stored valuation of a club on one date. Never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitValueHistory {
    pub id: String,
    pub club_id: String,
    pub valuation_date: NaiveDate,
    pub total_club_value: Decimal,
    pub total_units_outstanding: Decimal,
    pub unit_value: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUnitValue {
    pub club_id: String,
    pub valuation_date: NaiveDate,
    pub total_club_value: Decimal,
    pub total_units_outstanding: Decimal,
    pub unit_value: Decimal,
}

/// Everything a valuation reads from storage, taken from one consistent view.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationState {
    pub club: Club,
    pub funds: Vec<Fund>,
    pub positions: Vec<Position>,
    pub total_units_outstanding: Decimal,
}

/// Market value of one position on the valuation date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionValuation {
    pub fund_id: String,
    pub asset_id: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub market_value: Decimal,
}

/// Full breakdown of a NAV computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavCalculation {
    pub club_id: String,
    pub valuation_date: NaiveDate,
    pub positions: Vec<PositionValuation>,
    pub market_value: Decimal,
    pub bank_cash: Decimal,
    pub brokerage_cash: Decimal,
    pub total_cash: Decimal,
    pub total_club_value: Decimal,
    pub total_units_outstanding: Decimal,
    pub unit_value: Decimal,
    pub unpriced_asset_ids: Vec<String>,
}

impl NavCalculation {
    pub fn to_new_unit_value(&self) -> NewUnitValue {
        NewUnitValue {
            club_id: self.club_id.clone(),
            valuation_date: self.valuation_date,
            total_club_value: self.total_club_value,
            total_units_outstanding: self.total_units_outstanding,
            unit_value: self.unit_value,
        }
    }
}
