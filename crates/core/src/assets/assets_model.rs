//! Asset domain models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    Stock,
    Option,
}

impl AssetType {
    /// Returns the database string representation (SCREAMING_SNAKE_CASE).
    pub const fn as_db_str(&self) -> &'static str {
        match self {
            AssetType::Stock => "STOCK",
            AssetType::Option => "OPTION",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "STOCK" => Some(AssetType::Stock),
            "OPTION" => Some(AssetType::Option),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    pub const fn as_db_str(&self) -> &'static str {
        match self {
            OptionType::Call => "CALL",
            OptionType::Put => "PUT",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "CALL" => Some(OptionType::Call),
            "PUT" => Some(OptionType::Put),
            _ => None,
        }
    }
}

/// Terms of an option contract. These form the option's natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionContract {
    pub underlying_asset_id: String,
    pub option_type: OptionType,
    pub strike_price: Decimal,
    pub expiration_date: NaiveDate,
}

/// Domain model representing a tradable asset.
///
/// Identity and contract terms never change after creation; only `name` and
/// `currency` may be edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub asset_type: AssetType,
    pub symbol: String,
    pub name: Option<String>,
    pub currency: String,
    /// Present if and only if `asset_type` is `Option`.
    pub option: Option<OptionContract>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    pub fn is_option(&self) -> bool {
        self.asset_type == AssetType::Option
    }

    /// Returns the contract terms, failing for stocks.
    pub fn option_contract(&self) -> Result<&OptionContract> {
        self.option.as_ref().ok_or_else(|| {
            Error::invalid_input(format!("asset {} is not an option contract", self.id))
        })
    }
}

/// Input model for inserting an asset row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAsset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub asset_type: AssetType,
    pub symbol: String,
    pub name: Option<String>,
    pub currency: String,
    pub option: Option<OptionContract>,
}

impl NewAsset {
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Asset symbol cannot be empty".to_string(),
            )));
        }
        validate_currency(&self.currency)?;
        match (self.asset_type, &self.option) {
            (AssetType::Stock, None) => Ok(()),
            (AssetType::Stock, Some(_)) => Err(Error::Validation(
                ValidationError::ForbiddenField("option".to_string()),
            )),
            (AssetType::Option, None) => Err(Error::Validation(ValidationError::MissingField(
                "option".to_string(),
            ))),
            (AssetType::Option, Some(contract)) => {
                if contract.strike_price <= Decimal::ZERO {
                    return Err(Error::invalid_input("Strike price must be positive"));
                }
                Ok(())
            }
        }
    }
}

/// Request to register (or look up) a stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStock {
    pub symbol: String,
    pub name: Option<String>,
    pub currency: String,
}

/// Request to register (or look up) an option contract on a known stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOptionContract {
    pub underlying_asset_id: String,
    pub option_type: OptionType,
    pub strike_price: Decimal,
    pub expiration_date: NaiveDate,
    /// Defaults to the underlying's currency.
    pub currency: Option<String>,
}

/// The editable part of an asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetProfileUpdate {
    pub name: Option<String>,
    pub currency: String,
}

impl AssetProfileUpdate {
    pub fn validate(&self) -> Result<()> {
        validate_currency(&self.currency)
    }
}

fn validate_currency(currency: &str) -> Result<()> {
    let currency = currency.trim();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Error::invalid_input(format!(
            "Currency must be a three-letter code, got '{}'",
            currency
        )));
    }
    Ok(())
}

/// Builds the OCC-style code for an option: root, YYMMDD, C/P, strike×1000 in 8 digits.
pub fn option_symbol(underlying_symbol: &str, contract: &OptionContract) -> String {
    let right = match contract.option_type {
        OptionType::Call => 'C',
        OptionType::Put => 'P',
    };
    let strike_thousandths = (contract.strike_price * dec!(1000)).round();
    format!(
        "{}{}{}{:0>8}",
        underlying_symbol.trim().to_uppercase(),
        contract.expiration_date.format("%y%m%d"),
        right,
        strike_thousandths.to_string()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract(option_type: OptionType, strike: Decimal) -> OptionContract {
        OptionContract {
            underlying_asset_id: "stock-aapl".to_string(),
            option_type,
            strike_price: strike,
            expiration_date: NaiveDate::from_ymd_opt(2026, 1, 16).unwrap(),
        }
    }

    #[test]
    fn option_symbol_follows_occ_layout() {
        assert_eq!(
            option_symbol("aapl", &contract(OptionType::Call, dec!(150))),
            "AAPL260116C00150000"
        );
        assert_eq!(
            option_symbol("SPY", &contract(OptionType::Put, dec!(412.5))),
            "SPY260116P00412500"
        );
    }

    #[test]
    fn stock_cannot_carry_contract_terms() {
        let asset = NewAsset {
            id: None,
            asset_type: AssetType::Stock,
            symbol: "AAPL".to_string(),
            name: None,
            currency: "USD".to_string(),
            option: Some(contract(OptionType::Call, dec!(150))),
        };
        assert!(asset.validate().is_err());
    }

    #[test]
    fn option_requires_positive_strike() {
        let asset = NewAsset {
            id: None,
            asset_type: AssetType::Option,
            symbol: "AAPL260116C00000000".to_string(),
            name: None,
            currency: "USD".to_string(),
            option: Some(contract(OptionType::Call, Decimal::ZERO)),
        };
        assert!(asset.validate().is_err());
    }

    #[test]
    fn currency_must_be_three_letters() {
        let update = AssetProfileUpdate {
            name: None,
            currency: "US".to_string(),
        };
        assert!(update.validate().is_err());
        let update = AssetProfileUpdate {
            name: Some("Apple".to_string()),
            currency: "usd".to_string(),
        };
        assert!(update.validate().is_ok());
    }

    #[test]
    fn type_codes_round_trip() {
        for t in [AssetType::Stock, AssetType::Option] {
            assert_eq!(AssetType::from_db_str(t.as_db_str()), Some(t));
        }
        for t in [OptionType::Call, OptionType::Put] {
            assert_eq!(OptionType::from_db_str(t.as_db_str()), Some(t));
        }
        assert_eq!(AssetType::from_db_str("BOND"), None);
    }
}
