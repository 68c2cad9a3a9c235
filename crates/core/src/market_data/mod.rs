//! Market data module - the price provider contract consumed by NAV calculation.

mod market_data_errors;
mod market_data_traits;
mod price_lookup;

pub use market_data_errors::MarketDataError;
pub use market_data_traits::MarketPriceProviderTrait;
pub use price_lookup::{fetch_prices, PriceSheet};
