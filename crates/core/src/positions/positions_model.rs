use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::assets::Asset;

/// Quantity and average cost of one asset held by one fund.
///
/// There is at most one position per `(fund_id, asset_id)`. Rows are kept at
/// zero quantity once closed so the history of the pair stays addressable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: String,
    pub fund_id: String,
    pub asset_id: String,
    /// Shares for stocks, contracts for options.
    pub quantity: Decimal,
    /// Per-share (or per-contract) cost. Only recomputed when quantity grows.
    pub average_cost_basis: Decimal,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Position {
    pub fn total_cost_basis(&self) -> Decimal {
        self.quantity * self.average_cost_basis
    }

    pub fn is_open(&self) -> bool {
        !self.quantity.is_zero()
    }
}

/// A position together with the asset it refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub position: Position,
    pub asset: Asset,
}
