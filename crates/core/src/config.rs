//! Runtime configuration shared by the ledger services.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::BOOTSTRAP_UNIT_VALUE;

/// Tunables for unit issuance and valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerConfig {
    /// Unit value applied to deposits before the first usable valuation.
    pub bootstrap_unit_value: Decimal,
    /// Upper bound on a single market price lookup during NAV calculation.
    #[serde(with = "duration_millis")]
    pub price_lookup_timeout: Duration,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            bootstrap_unit_value: BOOTSTRAP_UNIT_VALUE,
            price_lookup_timeout: Duration::from_secs(30),
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
