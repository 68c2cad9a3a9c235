use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::errors::Result;

/// Source of asset prices as of a valuation date.
#[async_trait]
pub trait MarketPriceProviderTrait: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &str;

    /// Returns a price for each requested asset id.
    ///
    /// Implementations should return an entry (possibly zero) for every id and
    /// must not fail because a single asset has no price.
    async fn get_prices(
        &self,
        asset_ids: &[String],
        as_of: NaiveDate,
    ) -> Result<HashMap<String, Decimal>>;
}
