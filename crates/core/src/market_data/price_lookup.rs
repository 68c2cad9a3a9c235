use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::time::Duration;

use super::market_data_errors::MarketDataError;
use super::market_data_traits::MarketPriceProviderTrait;
use crate::errors::{Error, Result};

/// Prices resolved for one valuation date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSheet {
    pub prices: HashMap<String, Decimal>,
    /// Assets valued at zero because the provider had no usable price.
    pub unpriced_asset_ids: Vec<String>,
}

impl PriceSheet {
    pub fn price_of(&self, asset_id: &str) -> Decimal {
        self.prices.get(asset_id).copied().unwrap_or(Decimal::ZERO)
    }
}

/// Fetches prices for `asset_ids` in one batched call bounded by `timeout`.
///
/// Provider failures and timeouts become [`MarketDataError`]. Missing,
/// zero or negative prices are recorded as unpriced and valued at zero.
pub async fn fetch_prices(
    provider: &dyn MarketPriceProviderTrait,
    asset_ids: &[String],
    as_of: NaiveDate,
    timeout: Duration,
) -> Result<PriceSheet> {
    if asset_ids.is_empty() {
        return Ok(PriceSheet::default());
    }

    debug!(
        "Requesting {} prices from {} as of {}",
        asset_ids.len(),
        provider.name(),
        as_of
    );
    let fetched = match tokio::time::timeout(timeout, provider.get_prices(asset_ids, as_of)).await
    {
        Ok(Ok(prices)) => prices,
        Ok(Err(err)) => {
            return Err(MarketDataError::ProviderError {
                provider: provider.name().to_string(),
                message: err.to_string(),
            }
            .into())
        }
        Err(_) => {
            let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            return Err(Error::MarketData(MarketDataError::Timeout(millis)));
        }
    };

    let mut sheet = PriceSheet::default();
    for asset_id in asset_ids {
        match fetched.get(asset_id) {
            Some(price) if *price > Decimal::ZERO => {
                sheet.prices.insert(asset_id.clone(), *price);
            }
            _ => {
                warn!(
                    "No price for asset {} on {}, valuing it at 0",
                    asset_id, as_of
                );
                sheet.prices.insert(asset_id.clone(), Decimal::ZERO);
                sheet.unpriced_asset_ids.push(asset_id.clone());
            }
        }
    }
    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    struct FixedProvider {
        prices: HashMap<String, Decimal>,
        delay: Option<Duration>,
        fail: bool,
    }

    #[async_trait]
    impl MarketPriceProviderTrait for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn get_prices(
            &self,
            _asset_ids: &[String],
            _as_of: NaiveDate,
        ) -> Result<HashMap<String, Decimal>> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(Error::Unexpected("upstream down".to_string()));
            }
            Ok(self.prices.clone())
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 28).unwrap()
    }

    #[tokio::test]
    async fn missing_prices_are_zero_and_reported() {
        let provider = FixedProvider {
            prices: HashMap::from([("aapl".to_string(), dec!(190.5))]),
            delay: None,
            fail: false,
        };
        let ids = vec!["aapl".to_string(), "delisted".to_string()];
        let sheet = fetch_prices(&provider, &ids, date(), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(sheet.price_of("aapl"), dec!(190.5));
        assert_eq!(sheet.price_of("delisted"), Decimal::ZERO);
        assert_eq!(sheet.unpriced_asset_ids, vec!["delisted".to_string()]);
    }

    #[tokio::test]
    async fn provider_failure_is_unavailable() {
        let provider = FixedProvider {
            prices: HashMap::new(),
            delay: None,
            fail: true,
        };
        let err = fetch_prices(&provider, &["x".to_string()], date(), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_provider_times_out() {
        let provider = FixedProvider {
            prices: HashMap::new(),
            delay: Some(Duration::from_secs(60)),
            fail: false,
        };
        let err = fetch_prices(
            &provider,
            &["x".to_string()],
            date(),
            Duration::from_millis(500),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            Error::MarketData(MarketDataError::Timeout(500))
        ));
    }

    #[tokio::test]
    async fn empty_request_skips_provider() {
        let provider = FixedProvider {
            prices: HashMap::new(),
            delay: None,
            fail: true,
        };
        let sheet = fetch_prices(&provider, &[], date(), Duration::from_secs(1))
            .await
            .unwrap();
        assert!(sheet.prices.is_empty());
    }
}
