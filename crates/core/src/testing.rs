//! In-memory repositories and fixtures for service tests.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::assets::{
    Asset, AssetProfileUpdate, AssetRepositoryTrait, AssetType, NewAsset, OptionContract,
};
use crate::clubs::{Club, ClubRepositoryTrait, Fund, FundSplit, NewClub, NewFund};
use crate::errors::{DatabaseError, Error, Result};
use crate::ledger::{LedgerPosting, LedgerRepositoryTrait};
use crate::market_data::MarketPriceProviderTrait;
use crate::members::{
    ClubMembership, MemberRole, MemberTransaction, MemberTransactionType,
    MembershipRepositoryTrait, NewMembership,
};
use crate::nav::{NewUnitValue, UnitValueHistory, UnitValueRepositoryTrait, ValuationState};
use crate::positions::{Position, PositionRepositoryTrait};
use crate::transactions::{
    Page, Transaction, TransactionFilter, TransactionPage, TransactionRepositoryTrait,
};

#[derive(Debug, Default, Clone)]
struct StoreState {
    clubs: Vec<Club>,
    funds: Vec<Fund>,
    splits: HashMap<String, Vec<FundSplit>>,
    assets: Vec<Asset>,
    positions: Vec<Position>,
    transactions: Vec<Transaction>,
    memberships: Vec<ClubMembership>,
    member_transactions: Vec<MemberTransaction>,
    unit_values: Vec<UnitValueHistory>,
}

fn stale(what: String) -> Error {
    DatabaseError::ConcurrentModification(what).into()
}

impl StoreState {
    fn apply(&mut self, posting: LedgerPosting) -> Result<()> {
        let now = Utc::now();
        if let Some(change) = posting.club_balance {
            let club = self
                .clubs
                .iter_mut()
                .find(|c| c.id == change.club_id)
                .ok_or_else(|| Error::not_found("Club", change.club_id.clone()))?;
            if club.version != change.expected_version {
                return Err(stale(format!("club {}", club.id)));
            }
            club.bank_account_balance = change.new_balance;
            club.version += 1;
            club.updated_at = now;
        }

        for change in posting.fund_balances {
            let fund = self
                .funds
                .iter_mut()
                .find(|f| f.id == change.fund_id)
                .ok_or_else(|| Error::not_found("Fund", change.fund_id.clone()))?;
            if fund.version != change.expected_version {
                return Err(stale(format!("fund {}", fund.id)));
            }
            fund.brokerage_cash_balance = change.new_balance;
            fund.version += 1;
            fund.updated_at = now;
        }

        for change in posting.positions {
            let new_position = change.position;
            match change.expected_version {
                None => {
                    if self.positions.iter().any(|p| {
                        p.fund_id == new_position.fund_id && p.asset_id == new_position.asset_id
                    }) {
                        return Err(stale(format!(
                            "position {}/{}",
                            new_position.fund_id, new_position.asset_id
                        )));
                    }
                    self.positions.push(new_position);
                }
                Some(expected) => {
                    let position = self
                        .positions
                        .iter_mut()
                        .find(|p| p.id == new_position.id)
                        .ok_or_else(|| stale(format!("position {}", new_position.id)))?;
                    if position.version != expected {
                        return Err(stale(format!("position {}", position.id)));
                    }
                    *position = new_position;
                }
            }
        }

        for transaction in posting.transactions {
            if let Some(reversed) = &transaction.reverses_transaction_id {
                if self
                    .transactions
                    .iter()
                    .any(|t| t.reverses_transaction_id.as_ref() == Some(reversed))
                {
                    return Err(DatabaseError::UniqueViolation(format!(
                        "transactions.reverses_transaction_id {}",
                        reversed
                    ))
                    .into());
                }
            }
            self.transactions.push(transaction);
        }

        if let Some(change) = posting.member_transaction {
            let membership = self
                .memberships
                .iter_mut()
                .find(|m| m.id == change.transaction.membership_id)
                .ok_or_else(|| {
                    Error::not_found("Membership", change.transaction.membership_id.clone())
                })?;
            if membership.version != change.membership_expected_version {
                return Err(stale(format!("membership {}", membership.id)));
            }
            membership.version += 1;
            membership.updated_at = now;
            self.member_transactions.push(change.transaction);
        }
        Ok(())
    }
}

/// A single in-memory store implementing every repository trait.
///
/// Postings are applied to a copy of the state and swapped in on success,
/// so a failed commit leaves nothing behind.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
    stale_commits: AtomicUsize,
    commits: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap()
    }

    /// Makes the next `count` commits fail as if another writer got there first.
    pub fn inject_stale_commits(&self, count: usize) {
        self.stale_commits.store(count, Ordering::SeqCst);
    }

    /// Number of postings applied successfully.
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.lock().transactions.clone()
    }

    pub fn positions(&self) -> Vec<Position> {
        self.lock().positions.clone()
    }

    /// Inserts a club with an opening bank balance.
    pub fn seed_club(&self, id: &str, bank_balance: Decimal) -> Club {
        let club = Club {
            id: id.to_string(),
            name: format!("Club {}", id),
            bank_account_balance: bank_balance,
            version: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.lock().clubs.push(club.clone());
        club
    }

    /// Inserts an active fund with opening brokerage cash.
    pub fn seed_fund(&self, club_id: &str, id: &str, cash: Decimal) -> Fund {
        let fund = Fund {
            id: id.to_string(),
            club_id: club_id.to_string(),
            name: format!("Fund {}", id),
            brokerage_cash_balance: cash,
            is_active: true,
            version: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.lock().funds.push(fund.clone());
        fund
    }

    pub fn seed_splits(&self, club_id: &str, splits: &[(&str, Decimal)]) {
        let splits = splits
            .iter()
            .map(|(fund_id, pct)| FundSplit {
                club_id: club_id.to_string(),
                fund_id: fund_id.to_string(),
                split_percentage: *pct,
            })
            .collect();
        self.lock().splits.insert(club_id.to_string(), splits);
    }

    pub fn seed_stock(&self, id: &str, symbol: &str) -> Asset {
        let asset = Asset {
            id: id.to_string(),
            asset_type: AssetType::Stock,
            symbol: symbol.to_string(),
            name: None,
            currency: "USD".to_string(),
            option: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.lock().assets.push(asset.clone());
        asset
    }

    pub fn seed_option(&self, id: &str, contract: OptionContract) -> Asset {
        let asset = Asset {
            id: id.to_string(),
            asset_type: AssetType::Option,
            symbol: id.to_uppercase(),
            name: None,
            currency: "USD".to_string(),
            option: Some(contract),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.lock().assets.push(asset.clone());
        asset
    }

    pub fn seed_position(
        &self,
        fund_id: &str,
        asset_id: &str,
        quantity: Decimal,
        cost: Decimal,
    ) -> Position {
        let position = Position {
            id: Uuid::new_v4().to_string(),
            fund_id: fund_id.to_string(),
            asset_id: asset_id.to_string(),
            quantity,
            average_cost_basis: cost,
            version: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.lock().positions.push(position.clone());
        position
    }

    pub fn seed_membership(&self, club_id: &str, id: &str) -> ClubMembership {
        let membership = ClubMembership {
            id: id.to_string(),
            club_id: club_id.to_string(),
            user_id: format!("user-{}", id),
            role: MemberRole::Member,
            version: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.lock().memberships.push(membership.clone());
        membership
    }

    /// Records a deposit issuing `units` to the membership without touching cash.
    pub fn seed_member_units(&self, club_id: &str, membership_id: &str, units: Decimal) {
        let transaction = MemberTransaction {
            id: Uuid::new_v4().to_string(),
            membership_id: membership_id.to_string(),
            club_id: club_id.to_string(),
            transaction_type: MemberTransactionType::Deposit,
            transaction_date: date(2024, 1, 1),
            amount: units * Decimal::TEN,
            unit_value_used: Decimal::TEN,
            units_transacted: units,
            created_at: Utc::now(),
        };
        self.lock().member_transactions.push(transaction);
    }

    /// Applies a member deposit directly: bank cash in, units issued.
    pub fn record_deposit(&self, club_id: &str, membership_id: &str, amount: Decimal, units: Decimal) {
        let mut state = self.lock();
        if let Some(club) = state.clubs.iter_mut().find(|c| c.id == club_id) {
            club.bank_account_balance += amount;
            club.version += 1;
        }
        state.member_transactions.push(MemberTransaction {
            id: Uuid::new_v4().to_string(),
            membership_id: membership_id.to_string(),
            club_id: club_id.to_string(),
            transaction_type: MemberTransactionType::Deposit,
            transaction_date: date(2024, 1, 1),
            amount,
            unit_value_used: amount / units,
            units_transacted: units,
            created_at: Utc::now(),
        });
    }

    pub fn seed_unit_value(
        &self,
        club_id: &str,
        date: NaiveDate,
        units: Decimal,
        unit_value: Decimal,
    ) -> UnitValueHistory {
        let snapshot = UnitValueHistory {
            id: Uuid::new_v4().to_string(),
            club_id: club_id.to_string(),
            valuation_date: date,
            total_club_value: units * unit_value,
            total_units_outstanding: units,
            unit_value,
            created_at: Utc::now(),
        };
        self.lock().unit_values.push(snapshot.clone());
        snapshot
    }
}

#[async_trait]
impl LedgerRepositoryTrait for InMemoryStore {
    async fn commit(&self, posting: LedgerPosting) -> Result<()> {
        if self
            .stale_commits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(stale("injected".to_string()));
        }
        let mut state = self.lock();
        let mut next = state.clone();
        next.apply(posting)?;
        *state = next;
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl ClubRepositoryTrait for InMemoryStore {
    async fn create_club(&self, new_club: NewClub) -> Result<Club> {
        let club = Club {
            id: new_club.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: new_club.name,
            bank_account_balance: Decimal::ZERO,
            version: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.lock().clubs.push(club.clone());
        Ok(club)
    }

    fn get_club(&self, club_id: &str) -> Result<Club> {
        self.lock()
            .clubs
            .iter()
            .find(|c| c.id == club_id)
            .cloned()
            .ok_or_else(|| Error::not_found("Club", club_id))
    }

    fn list_clubs(&self) -> Result<Vec<Club>> {
        Ok(self.lock().clubs.clone())
    }

    async fn create_fund(&self, new_fund: NewFund) -> Result<Fund> {
        let fund = Fund {
            id: new_fund.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            club_id: new_fund.club_id,
            name: new_fund.name,
            brokerage_cash_balance: Decimal::ZERO,
            is_active: true,
            version: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.lock().funds.push(fund.clone());
        Ok(fund)
    }

    fn get_fund(&self, fund_id: &str) -> Result<Fund> {
        self.lock()
            .funds
            .iter()
            .find(|f| f.id == fund_id)
            .cloned()
            .ok_or_else(|| Error::not_found("Fund", fund_id))
    }

    fn list_funds(&self, club_id: &str) -> Result<Vec<Fund>> {
        Ok(self
            .lock()
            .funds
            .iter()
            .filter(|f| f.club_id == club_id)
            .cloned()
            .collect())
    }

    async fn set_fund_active(&self, fund_id: &str, is_active: bool) -> Result<Fund> {
        let mut state = self.lock();
        let fund = state
            .funds
            .iter_mut()
            .find(|f| f.id == fund_id)
            .ok_or_else(|| Error::not_found("Fund", fund_id))?;
        fund.is_active = is_active;
        Ok(fund.clone())
    }

    async fn replace_fund_splits(
        &self,
        club_id: &str,
        splits: Vec<FundSplit>,
    ) -> Result<Vec<FundSplit>> {
        self.lock()
            .splits
            .insert(club_id.to_string(), splits.clone());
        Ok(splits)
    }

    fn list_fund_splits(&self, club_id: &str) -> Result<Vec<FundSplit>> {
        Ok(self
            .lock()
            .splits
            .get(club_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl AssetRepositoryTrait for InMemoryStore {
    async fn create(&self, new_asset: NewAsset) -> Result<Asset> {
        let mut state = self.lock();
        let duplicate = state.assets.iter().any(|a| match (&a.option, &new_asset.option) {
            (None, None) => a.symbol == new_asset.symbol,
            (Some(existing), Some(requested)) => existing == requested,
            _ => false,
        });
        if duplicate {
            return Err(DatabaseError::UniqueViolation(format!("asset {}", new_asset.symbol)).into());
        }
        let asset = Asset {
            id: new_asset.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            asset_type: new_asset.asset_type,
            symbol: new_asset.symbol,
            name: new_asset.name,
            currency: new_asset.currency,
            option: new_asset.option,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        state.assets.push(asset.clone());
        Ok(asset)
    }

    async fn update_profile(&self, asset_id: &str, payload: AssetProfileUpdate) -> Result<Asset> {
        let mut state = self.lock();
        let asset = state
            .assets
            .iter_mut()
            .find(|a| a.id == asset_id)
            .ok_or_else(|| Error::not_found("Asset", asset_id))?;
        asset.name = payload.name;
        asset.currency = payload.currency;
        asset.updated_at = Utc::now();
        Ok(asset.clone())
    }

    fn get_by_id(&self, asset_id: &str) -> Result<Asset> {
        self.lock()
            .assets
            .iter()
            .find(|a| a.id == asset_id)
            .cloned()
            .ok_or_else(|| Error::not_found("Asset", asset_id))
    }

    fn list(&self) -> Result<Vec<Asset>> {
        Ok(self.lock().assets.clone())
    }

    fn list_by_asset_ids(&self, asset_ids: &[String]) -> Result<Vec<Asset>> {
        Ok(self
            .lock()
            .assets
            .iter()
            .filter(|a| asset_ids.contains(&a.id))
            .cloned()
            .collect())
    }

    fn find_stock(&self, symbol: &str) -> Result<Option<Asset>> {
        Ok(self
            .lock()
            .assets
            .iter()
            .find(|a| a.asset_type == AssetType::Stock && a.symbol == symbol)
            .cloned())
    }

    fn find_option(&self, contract: &OptionContract) -> Result<Option<Asset>> {
        Ok(self
            .lock()
            .assets
            .iter()
            .find(|a| a.option.as_ref() == Some(contract))
            .cloned())
    }
}

impl PositionRepositoryTrait for InMemoryStore {
    fn get_position(&self, fund_id: &str, asset_id: &str) -> Result<Option<Position>> {
        Ok(self
            .lock()
            .positions
            .iter()
            .find(|p| p.fund_id == fund_id && p.asset_id == asset_id)
            .cloned())
    }

    fn list_by_fund(&self, fund_id: &str) -> Result<Vec<Position>> {
        Ok(self
            .lock()
            .positions
            .iter()
            .filter(|p| p.fund_id == fund_id)
            .cloned()
            .collect())
    }

    fn list_by_funds(&self, fund_ids: &[String]) -> Result<Vec<Position>> {
        Ok(self
            .lock()
            .positions
            .iter()
            .filter(|p| fund_ids.contains(&p.fund_id))
            .cloned()
            .collect())
    }
}

impl TransactionRepositoryTrait for InMemoryStore {
    fn get_by_id(&self, transaction_id: &str) -> Result<Transaction> {
        self.lock()
            .transactions
            .iter()
            .find(|t| t.id == transaction_id)
            .cloned()
            .ok_or_else(|| Error::not_found("Transaction", transaction_id))
    }

    fn find_reversal_of(&self, transaction_id: &str) -> Result<Option<Transaction>> {
        Ok(self
            .lock()
            .transactions
            .iter()
            .find(|t| t.reverses_transaction_id.as_deref() == Some(transaction_id))
            .cloned())
    }

    fn list(&self, filter: &TransactionFilter, page: Page) -> Result<TransactionPage> {
        let mut matching: Vec<Transaction> = self
            .lock()
            .transactions
            .iter()
            .filter(|t| t.club_id == filter.club_id)
            .filter(|t| filter.fund_id.is_none() || t.fund_id == filter.fund_id)
            .filter(|t| filter.asset_id.is_none() || t.asset_id == filter.asset_id)
            .filter(|t| {
                filter
                    .transaction_type
                    .map_or(true, |kind| t.transaction_type == kind)
            })
            .filter(|t| filter.date_from.map_or(true, |d| t.transaction_date >= d))
            .filter(|t| filter.date_to.map_or(true, |d| t.transaction_date <= d))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.transaction_date
                .cmp(&a.transaction_date)
                .then(b.created_at.cmp(&a.created_at))
        });
        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect();
        Ok(TransactionPage {
            items,
            total,
            offset: page.offset,
            limit: page.limit,
        })
    }
}

#[async_trait]
impl MembershipRepositoryTrait for InMemoryStore {
    async fn create(&self, new_membership: NewMembership) -> Result<ClubMembership> {
        let mut state = self.lock();
        if state
            .memberships
            .iter()
            .any(|m| m.club_id == new_membership.club_id && m.user_id == new_membership.user_id)
        {
            return Err(DatabaseError::UniqueViolation(format!(
                "membership {}/{}",
                new_membership.user_id, new_membership.club_id
            ))
            .into());
        }
        let membership = ClubMembership {
            id: new_membership
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            club_id: new_membership.club_id,
            user_id: new_membership.user_id,
            role: new_membership.role,
            version: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        state.memberships.push(membership.clone());
        Ok(membership)
    }

    fn get_by_id(&self, membership_id: &str) -> Result<ClubMembership> {
        self.lock()
            .memberships
            .iter()
            .find(|m| m.id == membership_id)
            .cloned()
            .ok_or_else(|| Error::not_found("Membership", membership_id))
    }

    fn list_by_club(&self, club_id: &str) -> Result<Vec<ClubMembership>> {
        Ok(self
            .lock()
            .memberships
            .iter()
            .filter(|m| m.club_id == club_id)
            .cloned()
            .collect())
    }

    async fn update_role(&self, membership_id: &str, role: MemberRole) -> Result<ClubMembership> {
        let mut state = self.lock();
        let membership = state
            .memberships
            .iter_mut()
            .find(|m| m.id == membership_id)
            .ok_or_else(|| Error::not_found("Membership", membership_id))?;
        membership.role = role;
        membership.version += 1;
        Ok(membership.clone())
    }

    async fn delete(&self, membership_id: &str, expected_version: i64) -> Result<()> {
        let mut state = self.lock();
        let index = state
            .memberships
            .iter()
            .position(|m| m.id == membership_id)
            .ok_or_else(|| Error::not_found("Membership", membership_id))?;
        if state.memberships[index].version != expected_version {
            return Err(stale(format!("membership {}", membership_id)));
        }
        state.memberships.remove(index);
        state
            .member_transactions
            .retain(|t| t.membership_id != membership_id);
        Ok(())
    }

    fn list_member_transactions(&self, membership_id: &str) -> Result<Vec<MemberTransaction>> {
        Ok(self
            .lock()
            .member_transactions
            .iter()
            .filter(|t| t.membership_id == membership_id)
            .cloned()
            .collect())
    }

    fn get_unit_balance(&self, membership_id: &str) -> Result<Decimal> {
        Ok(self
            .lock()
            .member_transactions
            .iter()
            .filter(|t| t.membership_id == membership_id)
            .map(|t| t.units_transacted)
            .sum())
    }

    fn get_club_units_outstanding(&self, club_id: &str) -> Result<Decimal> {
        Ok(self
            .lock()
            .member_transactions
            .iter()
            .filter(|t| t.club_id == club_id)
            .map(|t| t.units_transacted)
            .sum())
    }
}

#[async_trait]
impl UnitValueRepositoryTrait for InMemoryStore {
    fn load_valuation_state(&self, club_id: &str) -> Result<ValuationState> {
        let state = self.lock();
        let club = state
            .clubs
            .iter()
            .find(|c| c.id == club_id)
            .cloned()
            .ok_or_else(|| Error::not_found("Club", club_id))?;
        let funds: Vec<Fund> = state
            .funds
            .iter()
            .filter(|f| f.club_id == club_id)
            .cloned()
            .collect();
        let positions = state
            .positions
            .iter()
            .filter(|p| funds.iter().any(|f| f.id == p.fund_id))
            .cloned()
            .collect();
        let total_units_outstanding = state
            .member_transactions
            .iter()
            .filter(|t| t.club_id == club_id)
            .map(|t| t.units_transacted)
            .sum();
        Ok(ValuationState {
            club,
            funds,
            positions,
            total_units_outstanding,
        })
    }

    async fn create(&self, new_unit_value: NewUnitValue) -> Result<UnitValueHistory> {
        let mut state = self.lock();
        if state.unit_values.iter().any(|u| {
            u.club_id == new_unit_value.club_id && u.valuation_date == new_unit_value.valuation_date
        }) {
            return Err(DatabaseError::UniqueViolation(format!(
                "unit value {}@{}",
                new_unit_value.club_id, new_unit_value.valuation_date
            ))
            .into());
        }
        let snapshot = UnitValueHistory {
            id: Uuid::new_v4().to_string(),
            club_id: new_unit_value.club_id,
            valuation_date: new_unit_value.valuation_date,
            total_club_value: new_unit_value.total_club_value,
            total_units_outstanding: new_unit_value.total_units_outstanding,
            unit_value: new_unit_value.unit_value,
            created_at: Utc::now(),
        };
        state.unit_values.push(snapshot.clone());
        Ok(snapshot)
    }

    fn get_latest(&self, club_id: &str) -> Result<Option<UnitValueHistory>> {
        Ok(self
            .lock()
            .unit_values
            .iter()
            .filter(|u| u.club_id == club_id)
            .max_by_key(|u| u.valuation_date)
            .cloned())
    }

    fn get_on_date(
        &self,
        club_id: &str,
        valuation_date: NaiveDate,
    ) -> Result<Option<UnitValueHistory>> {
        Ok(self
            .lock()
            .unit_values
            .iter()
            .find(|u| u.club_id == club_id && u.valuation_date == valuation_date)
            .cloned())
    }

    fn list(
        &self,
        club_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<UnitValueHistory>> {
        let mut snapshots: Vec<UnitValueHistory> = self
            .lock()
            .unit_values
            .iter()
            .filter(|u| u.club_id == club_id)
            .filter(|u| from.map_or(true, |d| u.valuation_date >= d))
            .filter(|u| to.map_or(true, |d| u.valuation_date <= d))
            .cloned()
            .collect();
        snapshots.sort_by_key(|u| u.valuation_date);
        Ok(snapshots)
    }
}

type FetchHook = Box<dyn FnOnce() + Send>;

/// Price provider answering from a fixed table.
#[derive(Default)]
pub struct MockPriceProvider {
    prices: Mutex<HashMap<String, Decimal>>,
    fail: bool,
    calls: AtomicUsize,
    on_fetch: Mutex<Option<FetchHook>>,
}

impl MockPriceProvider {
    pub fn with_prices(prices: &[(&str, Decimal)]) -> Arc<Self> {
        Arc::new(Self {
            prices: Mutex::new(
                prices
                    .iter()
                    .map(|(id, price)| (id.to_string(), *price))
                    .collect(),
            ),
            ..Self::default()
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    /// Runs `hook` once, inside the first price lookup.
    pub fn run_during_fetch(&self, hook: impl FnOnce() + Send + 'static) {
        *self.on_fetch.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketPriceProviderTrait for MockPriceProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn get_prices(
        &self,
        asset_ids: &[String],
        _as_of: NaiveDate,
    ) -> Result<HashMap<String, Decimal>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let hook = self.on_fetch.lock().unwrap().take();
        if let Some(hook) = hook {
            hook();
        }
        if self.fail {
            return Err(Error::Unexpected("quote service unreachable".to_string()));
        }
        let prices = self.prices.lock().unwrap();
        Ok(asset_ids
            .iter()
            .filter_map(|id| prices.get(id).map(|p| (id.clone(), *p)))
            .collect())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
