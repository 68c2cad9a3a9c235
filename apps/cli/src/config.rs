use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;

use clubfolio_core::constants::BOOTSTRAP_UNIT_VALUE;
use clubfolio_core::LedgerConfig;

pub struct Config {
    pub db_path: String,
    pub log_format: String,
    pub price_lookup_timeout: Duration,
    pub bootstrap_unit_value: Decimal,
}

impl Config {
    /// Reads `CLUBFOLIO_*` variables, after loading a `.env` file if present.
    /// Unparseable numbers fall back to their defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let db_path =
            std::env::var("CLUBFOLIO_DB_PATH").unwrap_or_else(|_| "./db/clubfolio.db".into());
        let log_format = std::env::var("CLUBFOLIO_LOG_FORMAT").unwrap_or_else(|_| "text".into());
        let timeout_ms: u64 = std::env::var("CLUBFOLIO_PRICE_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".into())
            .parse()
            .unwrap_or(30000);
        let bootstrap_unit_value = std::env::var("CLUBFOLIO_BOOTSTRAP_UNIT_VALUE")
            .ok()
            .and_then(|v| Decimal::from_str(v.trim()).ok())
            .filter(|v| *v > Decimal::ZERO)
            .unwrap_or(BOOTSTRAP_UNIT_VALUE);
        Self {
            db_path,
            log_format,
            price_lookup_timeout: Duration::from_millis(timeout_ms),
            bootstrap_unit_value,
        }
    }

    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            bootstrap_unit_value: self.bootstrap_unit_value,
            price_lookup_timeout: self.price_lookup_timeout,
        }
    }
}
