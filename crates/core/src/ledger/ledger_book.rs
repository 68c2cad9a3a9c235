//! In-memory working set for planning one posting.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;

use super::ledger_model::{ClubBalanceChange, FundBalanceChange, LedgerPosting, PositionChange};
use crate::clubs::{Club, Fund};
use crate::errors::{Error, LedgerError, Result};
use crate::positions::{apply_quantity_change, Position};
use crate::transactions::Transaction;

type PositionKey = (String, String);

/// Balances and positions read for one operation, mutated in memory and
/// turned into a [`LedgerPosting`].
///
/// Every debit is checked against the running balance, so a plan that would
/// overdraw an account fails before anything is written.
#[derive(Debug, Clone)]
pub struct LedgerBook {
    club: Club,
    bank_balance: Decimal,
    funds: HashMap<String, Fund>,
    fund_balances: HashMap<String, Decimal>,
    positions: HashMap<PositionKey, Position>,
    original_position_versions: HashMap<PositionKey, Option<i64>>,
    transactions: Vec<Transaction>,
    now: DateTime<Utc>,
}

impl LedgerBook {
    /// `funds` must be the club's funds; `positions` whatever the plan may touch.
    pub fn new(club: Club, funds: Vec<Fund>, positions: Vec<Position>, now: DateTime<Utc>) -> Self {
        let bank_balance = club.bank_account_balance;
        let funds: HashMap<String, Fund> = funds
            .into_iter()
            .filter(|f| f.club_id == club.id)
            .map(|f| (f.id.clone(), f))
            .collect();
        let fund_balances = funds
            .values()
            .map(|f| (f.id.clone(), f.brokerage_cash_balance))
            .collect();
        let positions = positions
            .into_iter()
            .map(|p| ((p.fund_id.clone(), p.asset_id.clone()), p))
            .collect();
        Self {
            club,
            bank_balance,
            funds,
            fund_balances,
            positions,
            original_position_versions: HashMap::new(),
            transactions: Vec::new(),
            now,
        }
    }

    pub fn club(&self) -> &Club {
        &self.club
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn bank_balance(&self) -> Decimal {
        self.bank_balance
    }

    /// Returns the fund if it belongs to this club.
    pub fn fund(&self, fund_id: &str) -> Result<&Fund> {
        self.funds
            .get(fund_id)
            .ok_or_else(|| Error::not_found("Fund", fund_id))
    }

    pub fn fund_balance(&self, fund_id: &str) -> Result<Decimal> {
        self.fund(fund_id)?;
        Ok(self
            .fund_balances
            .get(fund_id)
            .copied()
            .unwrap_or(Decimal::ZERO))
    }

    pub fn position(&self, fund_id: &str, asset_id: &str) -> Option<&Position> {
        self.positions
            .get(&(fund_id.to_string(), asset_id.to_string()))
    }

    pub fn credit_bank(&mut self, amount: Decimal) {
        self.bank_balance += amount;
    }

    pub fn debit_bank(&mut self, amount: Decimal) -> Result<()> {
        if self.bank_balance < amount {
            return Err(LedgerError::InsufficientFunds {
                account: format!("club {} bank account", self.club.id),
                available: self.bank_balance,
                required: amount,
            }
            .into());
        }
        self.bank_balance -= amount;
        Ok(())
    }

    pub fn credit_fund(&mut self, fund_id: &str, amount: Decimal) -> Result<()> {
        let balance = self.fund_balance(fund_id)?;
        self.fund_balances
            .insert(fund_id.to_string(), balance + amount);
        Ok(())
    }

    pub fn debit_fund(&mut self, fund_id: &str, amount: Decimal) -> Result<()> {
        let balance = self.fund_balance(fund_id)?;
        if balance < amount {
            return Err(LedgerError::InsufficientFunds {
                account: format!("fund {} brokerage cash", fund_id),
                available: balance,
                required: amount,
            }
            .into());
        }
        self.fund_balances
            .insert(fund_id.to_string(), balance - amount);
        Ok(())
    }

    /// Applies a quantity change through the position ledger.
    pub fn change_position(
        &mut self,
        fund_id: &str,
        asset_id: &str,
        delta: Decimal,
        price_per_unit: Decimal,
    ) -> Result<&Position> {
        self.fund(fund_id)?;
        let key = (fund_id.to_string(), asset_id.to_string());
        let current = self.positions.get(&key);
        let change =
            apply_quantity_change(current, fund_id, asset_id, delta, price_per_unit, self.now)?;
        self.original_position_versions
            .entry(key.clone())
            .or_insert(change.expected_version);
        self.positions.insert(key.clone(), change.position);
        self.positions
            .get(&key)
            .ok_or_else(|| Error::Unexpected("position vanished from ledger book".to_string()))
    }

    /// Queues a transaction row. Rows are inserted in the order they are recorded.
    pub fn record(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    pub fn recorded(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Builds the posting holding every change made to this book.
    pub fn into_posting(self) -> LedgerPosting {
        let club_balance = (self.bank_balance != self.club.bank_account_balance).then(|| {
            ClubBalanceChange {
                club_id: self.club.id.clone(),
                expected_version: self.club.version,
                new_balance: self.bank_balance,
            }
        });

        let mut fund_balances: Vec<FundBalanceChange> = self
            .funds
            .values()
            .filter_map(|fund| {
                let balance = self.fund_balances.get(&fund.id).copied()?;
                (balance != fund.brokerage_cash_balance).then(|| FundBalanceChange {
                    fund_id: fund.id.clone(),
                    expected_version: fund.version,
                    new_balance: balance,
                })
            })
            .collect();
        fund_balances.sort_by(|a, b| a.fund_id.cmp(&b.fund_id));

        let mut positions: Vec<PositionChange> = self
            .original_position_versions
            .iter()
            .filter_map(|(key, expected_version)| {
                let mut position = self.positions.get(key)?.clone();
                position.version = expected_version.map_or(0, |v| v + 1);
                Some(PositionChange {
                    position,
                    expected_version: *expected_version,
                })
            })
            .collect();
        positions.sort_by(|a, b| {
            (&a.position.fund_id, &a.position.asset_id)
                .cmp(&(&b.position.fund_id, &b.position.asset_id))
        });

        LedgerPosting {
            club_balance,
            fund_balances,
            positions,
            transactions: self.transactions,
            member_transaction: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use rust_decimal_macros::dec;

    fn club(balance: Decimal) -> Club {
        Club {
            id: "club-1".to_string(),
            name: "Maple Street Investors".to_string(),
            bank_account_balance: balance,
            version: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn fund(id: &str, club_id: &str, balance: Decimal) -> Fund {
        Fund {
            id: id.to_string(),
            club_id: club_id.to_string(),
            name: id.to_uppercase(),
            brokerage_cash_balance: balance,
            is_active: true,
            version: 7,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn untouched_book_produces_empty_posting() {
        let book = LedgerBook::new(
            club(dec!(100)),
            vec![fund("fund-a", "club-1", dec!(50))],
            vec![],
            Utc::now(),
        );
        assert!(book.into_posting().is_empty());
    }

    #[test]
    fn funds_of_other_clubs_are_not_found() {
        let book = LedgerBook::new(
            club(dec!(100)),
            vec![fund("fund-x", "club-2", dec!(50))],
            vec![],
            Utc::now(),
        );
        assert_eq!(book.fund("fund-x").unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn overdraft_is_rejected_and_leaves_balance() {
        let mut book = LedgerBook::new(
            club(dec!(100)),
            vec![fund("fund-a", "club-1", dec!(50))],
            vec![],
            Utc::now(),
        );
        let err = book.debit_fund("fund-a", dec!(50.01)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
        assert_eq!(book.fund_balance("fund-a").unwrap(), dec!(50));
        assert!(book.debit_bank(dec!(100.01)).is_err());
        assert_eq!(book.bank_balance(), dec!(100));
    }

    #[test]
    fn posting_carries_versions_read() {
        let mut book = LedgerBook::new(
            club(dec!(100)),
            vec![
                fund("fund-a", "club-1", dec!(50)),
                fund("fund-b", "club-1", dec!(0)),
            ],
            vec![],
            Utc::now(),
        );
        book.debit_bank(dec!(40)).unwrap();
        book.credit_fund("fund-b", dec!(40)).unwrap();
        let posting = book.into_posting();

        let club_change = posting.club_balance.unwrap();
        assert_eq!(club_change.expected_version, 3);
        assert_eq!(club_change.new_balance, dec!(60));
        assert_eq!(posting.fund_balances.len(), 1);
        assert_eq!(posting.fund_balances[0].fund_id, "fund-b");
        assert_eq!(posting.fund_balances[0].expected_version, 7);
        assert_eq!(posting.fund_balances[0].new_balance, dec!(40));
    }

    #[test]
    fn repeated_position_changes_keep_original_version() {
        let mut book = LedgerBook::new(
            club(dec!(0)),
            vec![fund("fund-a", "club-1", dec!(0))],
            vec![],
            Utc::now(),
        );
        book.change_position("fund-a", "aapl", dec!(10), dec!(100))
            .unwrap();
        book.change_position("fund-a", "aapl", dec!(10), dec!(200))
            .unwrap();
        let posting = book.into_posting();
        assert_eq!(posting.positions.len(), 1);
        let change = &posting.positions[0];
        assert_eq!(change.expected_version, None);
        assert_eq!(change.position.version, 0);
        assert_eq!(change.position.quantity, dec!(20));
        assert_eq!(change.position.average_cost_basis, dec!(150));
    }
}
