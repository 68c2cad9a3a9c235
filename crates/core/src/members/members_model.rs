//! Membership and member cash-flow models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::{Error, Result, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    Admin,
    Member,
    ReadOnly,
}

impl MemberRole {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Admin => "ADMIN",
            MemberRole::Member => "MEMBER",
            MemberRole::ReadOnly => "READ_ONLY",
        }
    }
}

impl FromStr for MemberRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ADMIN" => Ok(MemberRole::Admin),
            "MEMBER" => Ok(MemberRole::Member),
            "READ_ONLY" => Ok(MemberRole::ReadOnly),
            other => Err(Error::invalid_input(format!("Unknown member role '{}'", other))),
        }
    }
}

/// A user's membership in a club.
///
/// The unit balance is not stored here; it is the sum of the membership's
/// `units_transacted`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubMembership {
    pub id: String,
    pub club_id: String,
    pub user_id: String,
    pub role: MemberRole,
    /// Bumped by every member transaction and role change.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMembership {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub club_id: String,
    pub user_id: String,
    pub role: MemberRole,
}

impl NewMembership {
    pub fn validate(&self) -> Result<()> {
        if self.club_id.trim().is_empty() {
            return Err(ValidationError::MissingField("clubId".to_string()).into());
        }
        if self.user_id.trim().is_empty() {
            return Err(ValidationError::MissingField("userId".to_string()).into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberTransactionType {
    Deposit,
    Withdrawal,
}

impl MemberTransactionType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MemberTransactionType::Deposit => "DEPOSIT",
            MemberTransactionType::Withdrawal => "WITHDRAWAL",
        }
    }
}

impl FromStr for MemberTransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "DEPOSIT" => Ok(MemberTransactionType::Deposit),
            "WITHDRAWAL" => Ok(MemberTransactionType::Withdrawal),
            other => Err(Error::invalid_input(format!(
                "Unknown member transaction type '{}'",
                other
            ))),
        }
    }
}

/// Immutable record of units issued or redeemed for cash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberTransaction {
    pub id: String,
    pub membership_id: String,
    pub club_id: String,
    pub transaction_type: MemberTransactionType,
    pub transaction_date: NaiveDate,
    /// Cash moved, always positive.
    pub amount: Decimal,
    pub unit_value_used: Decimal,
    /// Positive for deposits, negative for withdrawals.
    pub units_transacted: Decimal,
    pub created_at: DateTime<Utc>,
}

/// A member deposit or withdrawal request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberCashMovement {
    pub club_id: String,
    pub membership_id: String,
    pub amount: Decimal,
    pub transaction_date: NaiveDate,
}

impl MemberCashMovement {
    pub fn validate(&self) -> Result<()> {
        if self.amount <= Decimal::ZERO {
            return Err(Error::invalid_input(format!(
                "Amount must be greater than zero, got {}",
                self.amount
            )));
        }
        Ok(())
    }
}

/// A member's stake valued at the latest unit value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberEquity {
    pub membership_id: String,
    pub units: Decimal,
    /// Zero when the club has no valuation yet.
    pub unit_value: Decimal,
    pub valuation_date: Option<NaiveDate>,
    pub equity: Decimal,
}
