//! Club and fund domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{errors::ValidationError, Error, Result};

/// Domain model representing an investment club.
///
/// `bank_account_balance` is cash held at the bank and not yet allocated to
/// any fund. It only moves through ledger postings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    pub id: String,
    pub name: String,
    pub bank_account_balance: Decimal,
    /// Optimistic concurrency token, bumped on every balance write.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input model for creating a new club.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClub {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

impl NewClub {
    /// Validates the new club data.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Club name cannot be empty".to_string(),
            )));
        }
        Ok(())
    }
}

/// A brokerage fund owned by a club.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fund {
    pub id: String,
    pub club_id: String,
    pub name: String,
    pub brokerage_cash_balance: Decimal,
    pub is_active: bool,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input model for creating a new fund.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFund {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub club_id: String,
    pub name: String,
}

impl NewFund {
    pub fn validate(&self) -> Result<()> {
        if self.club_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "clubId".to_string(),
            )));
        }
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Fund name cannot be empty".to_string(),
            )));
        }
        Ok(())
    }
}

/// Share of club-level cash routed to one fund on a bank-to-brokerage transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundSplit {
    pub club_id: String,
    pub fund_id: String,
    /// Fraction in (0, 1].
    pub split_percentage: Decimal,
}

/// Input model for one entry of a club's split configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFundSplit {
    pub fund_id: String,
    pub split_percentage: Decimal,
}
