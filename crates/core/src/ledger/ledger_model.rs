use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::members::MemberTransaction;
use crate::positions::Position;
use crate::transactions::Transaction;

/// New bank balance for a club, valid only if the row is still at `expected_version`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubBalanceChange {
    pub club_id: String,
    pub expected_version: i64,
    pub new_balance: Decimal,
}

/// New brokerage cash balance for a fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundBalanceChange {
    pub fund_id: String,
    pub expected_version: i64,
    pub new_balance: Decimal,
}

/// Insert (`expected_version == None`) or compare-and-set update of a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionChange {
    pub position: Position,
    pub expected_version: Option<i64>,
}

/// A member deposit or withdrawal, guarded by the membership's version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberTransactionChange {
    pub transaction: MemberTransaction,
    pub membership_expected_version: i64,
}

/// Every write produced by one accounting operation.
///
/// A posting is applied all-or-nothing. If any versioned row moved since it
/// was read, nothing is written and the commit fails with
/// `DatabaseError::ConcurrentModification`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerPosting {
    pub club_balance: Option<ClubBalanceChange>,
    pub fund_balances: Vec<FundBalanceChange>,
    pub positions: Vec<PositionChange>,
    /// Inserted in order, so linked rows come after the rows they reference.
    pub transactions: Vec<Transaction>,
    pub member_transaction: Option<MemberTransactionChange>,
}

impl LedgerPosting {
    pub fn is_empty(&self) -> bool {
        self.club_balance.is_none()
            && self.fund_balances.is_empty()
            && self.positions.is_empty()
            && self.transactions.is_empty()
            && self.member_transaction.is_none()
    }
}
