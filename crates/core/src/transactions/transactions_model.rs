//! Transaction domain models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::MAX_PAGE_SIZE;
use crate::errors::{Error, Result, ValidationError};

/// Every kind of ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Buy,
    Sell,
    Dividend,
    BrokerageInterest,
    BankInterest,
    ClubExpense,
    BankToBrokerage,
    BrokerageToBank,
    InterfundCashTransfer,
    OptionExpiration,
    OptionExercise,
    OptionAssignment,
    Reversal,
    Adjustment,
}

impl TransactionType {
    pub const ALL: [TransactionType; 14] = [
        TransactionType::Buy,
        TransactionType::Sell,
        TransactionType::Dividend,
        TransactionType::BrokerageInterest,
        TransactionType::BankInterest,
        TransactionType::ClubExpense,
        TransactionType::BankToBrokerage,
        TransactionType::BrokerageToBank,
        TransactionType::InterfundCashTransfer,
        TransactionType::OptionExpiration,
        TransactionType::OptionExercise,
        TransactionType::OptionAssignment,
        TransactionType::Reversal,
        TransactionType::Adjustment,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Buy => "BUY",
            TransactionType::Sell => "SELL",
            TransactionType::Dividend => "DIVIDEND",
            TransactionType::BrokerageInterest => "BROKERAGE_INTEREST",
            TransactionType::BankInterest => "BANK_INTEREST",
            TransactionType::ClubExpense => "CLUB_EXPENSE",
            TransactionType::BankToBrokerage => "BANK_TO_BROKERAGE",
            TransactionType::BrokerageToBank => "BROKERAGE_TO_BANK",
            TransactionType::InterfundCashTransfer => "INTERFUND_CASH_TRANSFER",
            TransactionType::OptionExpiration => "OPTION_EXPIRATION",
            TransactionType::OptionExercise => "OPTION_EXERCISE",
            TransactionType::OptionAssignment => "OPTION_ASSIGNMENT",
            TransactionType::Reversal => "REVERSAL",
            TransactionType::Adjustment => "ADJUSTMENT",
        }
    }

    /// Kinds posted as a single row, which a REVERSAL can undo exactly.
    pub const fn is_reversible(&self) -> bool {
        matches!(
            self,
            TransactionType::Buy
                | TransactionType::Sell
                | TransactionType::Dividend
                | TransactionType::BrokerageInterest
                | TransactionType::BankInterest
                | TransactionType::ClubExpense
                | TransactionType::Adjustment
        )
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TransactionType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::invalid_input(format!("Unknown transaction type '{}'", s)))
    }
}

/// An immutable ledger record.
///
/// `total_amount` is the gross cash amount of the row before fees (for trades
/// `quantity × price_per_unit`). It is signed only for ADJUSTMENT rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub club_id: String,
    /// `None` for club-level rows.
    pub fund_id: Option<String>,
    pub asset_id: Option<String>,
    pub transaction_type: TransactionType,
    pub transaction_date: NaiveDate,
    pub quantity: Option<Decimal>,
    pub price_per_unit: Option<Decimal>,
    pub total_amount: Decimal,
    pub fees: Decimal,
    pub description: Option<String>,
    pub related_transaction_id: Option<String>,
    pub reverses_transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields of a BUY or SELL.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeDetails {
    pub fund_id: String,
    pub asset_id: String,
    pub quantity: Decimal,
    pub price_per_unit: Decimal,
    pub fees: Decimal,
}

/// Fields of an option expiration, exercise or assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionEventDetails {
    pub fund_id: String,
    /// The option contract asset.
    pub asset_id: String,
    /// Number of contracts.
    pub quantity: Decimal,
}

/// A transaction request, one variant per kind, carrying only that kind's fields.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionRequest {
    Buy(TradeDetails),
    Sell(TradeDetails),
    Dividend {
        fund_id: String,
        asset_id: String,
        amount: Decimal,
    },
    BrokerageInterest {
        fund_id: String,
        amount: Decimal,
    },
    BankInterest {
        amount: Decimal,
    },
    ClubExpense {
        amount: Decimal,
    },
    BankToBrokerage {
        amount: Decimal,
        fees: Decimal,
    },
    BrokerageToBank {
        fund_id: String,
        amount: Decimal,
        fees: Decimal,
    },
    InterfundCashTransfer {
        source_fund_id: String,
        target_fund_id: String,
        amount: Decimal,
        fees: Decimal,
    },
    OptionExpiration(OptionEventDetails),
    OptionExercise(OptionEventDetails),
    OptionAssignment(OptionEventDetails),
    /// Signed correction of a fund's cash, or of the club bank when `fund_id` is `None`.
    Adjustment {
        fund_id: Option<String>,
        amount: Decimal,
    },
    Reversal {
        transaction_id: String,
    },
}

impl TransactionRequest {
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            TransactionRequest::Buy(_) => TransactionType::Buy,
            TransactionRequest::Sell(_) => TransactionType::Sell,
            TransactionRequest::Dividend { .. } => TransactionType::Dividend,
            TransactionRequest::BrokerageInterest { .. } => TransactionType::BrokerageInterest,
            TransactionRequest::BankInterest { .. } => TransactionType::BankInterest,
            TransactionRequest::ClubExpense { .. } => TransactionType::ClubExpense,
            TransactionRequest::BankToBrokerage { .. } => TransactionType::BankToBrokerage,
            TransactionRequest::BrokerageToBank { .. } => TransactionType::BrokerageToBank,
            TransactionRequest::InterfundCashTransfer { .. } => {
                TransactionType::InterfundCashTransfer
            }
            TransactionRequest::OptionExpiration(_) => TransactionType::OptionExpiration,
            TransactionRequest::OptionExercise(_) => TransactionType::OptionExercise,
            TransactionRequest::OptionAssignment(_) => TransactionType::OptionAssignment,
            TransactionRequest::Adjustment { .. } => TransactionType::Adjustment,
            TransactionRequest::Reversal { .. } => TransactionType::Reversal,
        }
    }
}

/// A transaction to post against a club.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub club_id: String,
    pub transaction_date: NaiveDate,
    pub description: Option<String>,
    pub request: TransactionRequest,
}

impl NewTransaction {
    /// Checks field ranges. Cross-entity rules are checked when the posting is planned.
    pub fn validate(&self) -> Result<()> {
        if self.club_id.trim().is_empty() {
            return Err(ValidationError::MissingField("clubId".to_string()).into());
        }
        match &self.request {
            TransactionRequest::Buy(trade) | TransactionRequest::Sell(trade) => {
                positive("quantity", trade.quantity)?;
                non_negative("pricePerUnit", trade.price_per_unit)?;
                non_negative("fees", trade.fees)
            }
            TransactionRequest::Dividend { amount, .. }
            | TransactionRequest::BrokerageInterest { amount, .. }
            | TransactionRequest::BankInterest { amount }
            | TransactionRequest::ClubExpense { amount } => positive("amount", *amount),
            TransactionRequest::BankToBrokerage { amount, fees }
            | TransactionRequest::BrokerageToBank { amount, fees, .. } => {
                positive("amount", *amount)?;
                non_negative("fees", *fees)
            }
            TransactionRequest::InterfundCashTransfer {
                source_fund_id,
                target_fund_id,
                amount,
                fees,
            } => {
                if source_fund_id == target_fund_id {
                    return Err(Error::invalid_input(
                        "Source and target fund of a transfer must differ",
                    ));
                }
                positive("amount", *amount)?;
                non_negative("fees", *fees)
            }
            TransactionRequest::OptionExpiration(event)
            | TransactionRequest::OptionExercise(event)
            | TransactionRequest::OptionAssignment(event) => positive("quantity", event.quantity),
            TransactionRequest::Adjustment { amount, .. } => {
                if amount.is_zero() {
                    return Err(Error::invalid_input("Adjustment amount cannot be zero"));
                }
                if self
                    .description
                    .as_deref()
                    .map_or(true, |d| d.trim().is_empty())
                {
                    return Err(ValidationError::MissingField("description".to_string()).into());
                }
                Ok(())
            }
            TransactionRequest::Reversal { transaction_id } => {
                if transaction_id.trim().is_empty() {
                    return Err(
                        ValidationError::MissingField("reversesTransactionId".to_string()).into(),
                    );
                }
                Ok(())
            }
        }
    }
}

fn positive(field: &str, value: Decimal) -> Result<()> {
    if value <= Decimal::ZERO {
        return Err(Error::invalid_input(format!(
            "'{}' must be greater than zero, got {}",
            field, value
        )));
    }
    Ok(())
}

fn non_negative(field: &str, value: Decimal) -> Result<()> {
    if value < Decimal::ZERO {
        return Err(Error::invalid_input(format!(
            "'{}' cannot be negative, got {}",
            field, value
        )));
    }
    Ok(())
}

/// Flat transaction payload as received from an API caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    pub club_id: String,
    pub transaction_type: Option<TransactionType>,
    pub transaction_date: Option<NaiveDate>,
    pub fund_id: Option<String>,
    /// Only for INTERFUND_CASH_TRANSFER.
    pub target_fund_id: Option<String>,
    pub asset_id: Option<String>,
    pub quantity: Option<Decimal>,
    pub price_per_unit: Option<Decimal>,
    pub amount: Option<Decimal>,
    pub fees: Option<Decimal>,
    pub description: Option<String>,
    /// Only for REVERSAL.
    pub reverses_transaction_id: Option<String>,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| ValidationError::MissingField(field.to_string()).into())
}

fn forbidden<T>(value: &Option<T>, field: &str) -> Result<()> {
    if value.is_some() {
        return Err(ValidationError::ForbiddenField(field.to_string()).into());
    }
    Ok(())
}

/// Zero fees are tolerated on kinds that carry no fees.
fn no_fees(fees: Option<Decimal>) -> Result<()> {
    match fees {
        Some(f) if !f.is_zero() => Err(ValidationError::ForbiddenField("fees".to_string()).into()),
        _ => Ok(()),
    }
}

impl TryFrom<TransactionInput> for NewTransaction {
    type Error = Error;

    fn try_from(input: TransactionInput) -> Result<Self> {
        let transaction_type = required(input.transaction_type, "transactionType")?;
        let transaction_date = required(input.transaction_date, "transactionDate")?;
        let fees = input.fees.unwrap_or(Decimal::ZERO);

        if transaction_type != TransactionType::InterfundCashTransfer {
            forbidden(&input.target_fund_id, "targetFundId")?;
        }
        if transaction_type != TransactionType::Reversal {
            forbidden(&input.reverses_transaction_id, "reversesTransactionId")?;
        }

        let request = match transaction_type {
            TransactionType::Buy | TransactionType::Sell => {
                forbidden(&input.amount, "amount")?;
                let trade = TradeDetails {
                    fund_id: required(input.fund_id, "fundId")?,
                    asset_id: required(input.asset_id, "assetId")?,
                    quantity: required(input.quantity, "quantity")?,
                    price_per_unit: required(input.price_per_unit, "pricePerUnit")?,
                    fees,
                };
                if transaction_type == TransactionType::Buy {
                    TransactionRequest::Buy(trade)
                } else {
                    TransactionRequest::Sell(trade)
                }
            }
            TransactionType::Dividend => {
                forbid_trade_fields(&input)?;
                no_fees(input.fees)?;
                TransactionRequest::Dividend {
                    fund_id: required(input.fund_id, "fundId")?,
                    asset_id: required(input.asset_id, "assetId")?,
                    amount: required(input.amount, "amount")?,
                }
            }
            TransactionType::BrokerageInterest => {
                forbid_trade_fields(&input)?;
                forbidden(&input.asset_id, "assetId")?;
                no_fees(input.fees)?;
                TransactionRequest::BrokerageInterest {
                    fund_id: required(input.fund_id, "fundId")?,
                    amount: required(input.amount, "amount")?,
                }
            }
            TransactionType::BankInterest | TransactionType::ClubExpense => {
                forbid_trade_fields(&input)?;
                forbidden(&input.fund_id, "fundId")?;
                forbidden(&input.asset_id, "assetId")?;
                no_fees(input.fees)?;
                let amount = required(input.amount, "amount")?;
                if transaction_type == TransactionType::BankInterest {
                    TransactionRequest::BankInterest { amount }
                } else {
                    TransactionRequest::ClubExpense { amount }
                }
            }
            TransactionType::BankToBrokerage => {
                forbid_trade_fields(&input)?;
                forbidden(&input.fund_id, "fundId")?;
                forbidden(&input.asset_id, "assetId")?;
                TransactionRequest::BankToBrokerage {
                    amount: required(input.amount, "amount")?,
                    fees,
                }
            }
            TransactionType::BrokerageToBank => {
                forbid_trade_fields(&input)?;
                forbidden(&input.asset_id, "assetId")?;
                TransactionRequest::BrokerageToBank {
                    fund_id: required(input.fund_id, "fundId")?,
                    amount: required(input.amount, "amount")?,
                    fees,
                }
            }
            TransactionType::InterfundCashTransfer => {
                forbid_trade_fields(&input)?;
                forbidden(&input.asset_id, "assetId")?;
                TransactionRequest::InterfundCashTransfer {
                    source_fund_id: required(input.fund_id, "fundId")?,
                    target_fund_id: required(input.target_fund_id, "targetFundId")?,
                    amount: required(input.amount, "amount")?,
                    fees,
                }
            }
            TransactionType::OptionExpiration
            | TransactionType::OptionExercise
            | TransactionType::OptionAssignment => {
                forbidden(&input.price_per_unit, "pricePerUnit")?;
                forbidden(&input.amount, "amount")?;
                no_fees(input.fees)?;
                let event = OptionEventDetails {
                    fund_id: required(input.fund_id, "fundId")?,
                    asset_id: required(input.asset_id, "assetId")?,
                    quantity: required(input.quantity, "quantity")?,
                };
                match transaction_type {
                    TransactionType::OptionExpiration => TransactionRequest::OptionExpiration(event),
                    TransactionType::OptionExercise => TransactionRequest::OptionExercise(event),
                    _ => TransactionRequest::OptionAssignment(event),
                }
            }
            TransactionType::Adjustment => {
                forbid_trade_fields(&input)?;
                forbidden(&input.asset_id, "assetId")?;
                no_fees(input.fees)?;
                TransactionRequest::Adjustment {
                    fund_id: input.fund_id,
                    amount: required(input.amount, "amount")?,
                }
            }
            TransactionType::Reversal => {
                forbid_trade_fields(&input)?;
                forbidden(&input.fund_id, "fundId")?;
                forbidden(&input.asset_id, "assetId")?;
                forbidden(&input.amount, "amount")?;
                no_fees(input.fees)?;
                TransactionRequest::Reversal {
                    transaction_id: required(
                        input.reverses_transaction_id,
                        "reversesTransactionId",
                    )?,
                }
            }
        };

        let new_transaction = NewTransaction {
            club_id: input.club_id,
            transaction_date,
            description: input.description,
            request,
        };
        new_transaction.validate()?;
        Ok(new_transaction)
    }
}

fn forbid_trade_fields(input: &TransactionInput) -> Result<()> {
    forbidden(&input.quantity, "quantity")?;
    forbidden(&input.price_per_unit, "pricePerUnit")
}

/// The rows written by one posted transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostedTransaction {
    pub transaction: Transaction,
    /// Rows linked to `transaction`: the stock leg of an option event, the
    /// target leg of an interfund transfer, further per-fund transfer rows.
    pub linked: Vec<Transaction>,
    /// Part of a bank-to-brokerage amount not covered by the fund splits.
    /// It stays in the club bank.
    pub unallocated_amount: Decimal,
}

/// Filter for transaction listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilter {
    pub club_id: String,
    pub fund_id: Option<String>,
    pub asset_id: Option<String>,
    pub transaction_type: Option<TransactionType>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

impl Page {
    /// Clamps offset to ≥ 0 and limit to `1..=MAX_PAGE_SIZE`.
    pub fn normalized(self) -> Self {
        Self {
            offset: self.offset.max(0),
            limit: self.limit.clamp(1, MAX_PAGE_SIZE),
        }
    }
}

/// One page of transactions, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPage {
    pub items: Vec<Transaction>,
    pub total: i64,
    pub offset: i64,
    pub limit: i64,
}
