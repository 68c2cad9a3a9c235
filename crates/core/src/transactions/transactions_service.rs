use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use std::sync::Arc;

use super::transaction_processor::{process_transaction, ReversalTarget, TransactionContext};
use super::transactions_model::{
    NewTransaction, Page, PostedTransaction, Transaction, TransactionFilter, TransactionInput,
    TransactionPage, TransactionRequest,
};
use super::transactions_traits::{TransactionRepositoryTrait, TransactionServiceTrait};
use crate::assets::{Asset, AssetRepositoryTrait};
use crate::clubs::ClubRepositoryTrait;
use crate::errors::{Error, Result};
use crate::ledger::{retry_on_stale_write, LedgerBook, LedgerRepositoryTrait};
use crate::positions::{Position, PositionRepositoryTrait};

/// Service posting and querying club transactions.
pub struct TransactionService {
    club_repository: Arc<dyn ClubRepositoryTrait>,
    asset_repository: Arc<dyn AssetRepositoryTrait>,
    position_repository: Arc<dyn PositionRepositoryTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
}

impl TransactionService {
    pub fn new(
        club_repository: Arc<dyn ClubRepositoryTrait>,
        asset_repository: Arc<dyn AssetRepositoryTrait>,
        position_repository: Arc<dyn PositionRepositoryTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    ) -> Self {
        Self {
            club_repository,
            asset_repository,
            position_repository,
            transaction_repository,
            ledger_repository,
        }
    }

    /// Loads assets, splits and the reversal target the request refers to.
    fn load_context(&self, new: &NewTransaction) -> Result<TransactionContext> {
        let mut context = TransactionContext::default();
        match &new.request {
            TransactionRequest::Buy(trade) | TransactionRequest::Sell(trade) => {
                self.load_asset(&mut context, &trade.asset_id)?;
            }
            TransactionRequest::Dividend { asset_id, .. } => {
                self.load_asset(&mut context, asset_id)?;
            }
            TransactionRequest::OptionExpiration(event)
            | TransactionRequest::OptionExercise(event)
            | TransactionRequest::OptionAssignment(event) => {
                let option = self.load_asset(&mut context, &event.asset_id)?;
                if let Some(contract) = &option.option {
                    self.load_asset(&mut context, &contract.underlying_asset_id)?;
                }
            }
            TransactionRequest::BankToBrokerage { .. } => {
                context.fund_splits = self.club_repository.list_fund_splits(&new.club_id)?;
            }
            TransactionRequest::Reversal { transaction_id } => {
                let transaction = self.transaction_repository.get_by_id(transaction_id)?;
                if transaction.club_id != new.club_id {
                    return Err(Error::not_found("Transaction", transaction_id.clone()));
                }
                let already_reversed = self
                    .transaction_repository
                    .find_reversal_of(transaction_id)?
                    .is_some();
                context.reversal_target = Some(ReversalTarget {
                    transaction,
                    already_reversed,
                });
            }
            TransactionRequest::BrokerageInterest { .. }
            | TransactionRequest::BankInterest { .. }
            | TransactionRequest::ClubExpense { .. }
            | TransactionRequest::BrokerageToBank { .. }
            | TransactionRequest::InterfundCashTransfer { .. }
            | TransactionRequest::Adjustment { .. } => {}
        }
        Ok(context)
    }

    fn load_asset(&self, context: &mut TransactionContext, asset_id: &str) -> Result<Asset> {
        let asset = self.asset_repository.get_by_id(asset_id)?;
        context.assets.insert(asset.id.clone(), asset.clone());
        Ok(asset)
    }

    /// Reads the positions the request may touch.
    fn load_positions(
        &self,
        new: &NewTransaction,
        context: &TransactionContext,
    ) -> Result<Vec<Position>> {
        let mut keys: Vec<(&str, &str)> = Vec::new();
        match &new.request {
            TransactionRequest::Buy(trade) | TransactionRequest::Sell(trade) => {
                keys.push((trade.fund_id.as_str(), trade.asset_id.as_str()));
            }
            TransactionRequest::OptionExpiration(event)
            | TransactionRequest::OptionExercise(event)
            | TransactionRequest::OptionAssignment(event) => {
                keys.push((event.fund_id.as_str(), event.asset_id.as_str()));
                if let Some(contract) = context
                    .assets
                    .get(&event.asset_id)
                    .and_then(|a| a.option.as_ref())
                {
                    keys.push((event.fund_id.as_str(), contract.underlying_asset_id.as_str()));
                }
            }
            TransactionRequest::Reversal { .. } => {
                if let Some(target) = &context.reversal_target {
                    if let (Some(fund_id), Some(asset_id)) = (
                        target.transaction.fund_id.as_deref(),
                        target.transaction.asset_id.as_deref(),
                    ) {
                        keys.push((fund_id, asset_id));
                    }
                }
            }
            _ => {}
        }

        let mut positions = Vec::with_capacity(keys.len());
        for (fund_id, asset_id) in keys {
            if let Some(position) = self.position_repository.get_position(fund_id, asset_id)? {
                positions.push(position);
            }
        }
        Ok(positions)
    }

    async fn try_create(&self, new: &NewTransaction) -> Result<PostedTransaction> {
        let club = self.club_repository.get_club(&new.club_id)?;
        let funds = self.club_repository.list_funds(&club.id)?;
        let context = self.load_context(new)?;
        let positions = self.load_positions(new, &context)?;

        let mut book = LedgerBook::new(club, funds, positions, Utc::now());
        let posted = process_transaction(&mut book, &context, new)?;
        let posting = book.into_posting();
        debug!(
            "Committing {} with {} rows, {} fund balance changes, {} position changes",
            posted.transaction.transaction_type,
            posting.transactions.len(),
            posting.fund_balances.len(),
            posting.positions.len()
        );
        self.ledger_repository.commit(posting).await?;
        Ok(posted)
    }
}

#[async_trait]
impl TransactionServiceTrait for TransactionService {
    async fn create_transaction(&self, new: NewTransaction) -> Result<PostedTransaction> {
        new.validate()?;
        let posted = retry_on_stale_write("transaction", || self.try_create(&new)).await?;
        info!(
            "Posted {} {} in club {} ({} linked rows)",
            posted.transaction.transaction_type,
            posted.transaction.id,
            posted.transaction.club_id,
            posted.linked.len()
        );
        Ok(posted)
    }

    async fn create_transaction_from_input(
        &self,
        input: TransactionInput,
    ) -> Result<PostedTransaction> {
        let new = NewTransaction::try_from(input)?;
        self.create_transaction(new).await
    }

    fn get_transaction(&self, club_id: &str, transaction_id: &str) -> Result<Transaction> {
        let transaction = self.transaction_repository.get_by_id(transaction_id)?;
        if transaction.club_id != club_id {
            return Err(Error::not_found("Transaction", transaction_id));
        }
        Ok(transaction)
    }

    fn list_transactions(&self, filter: TransactionFilter, page: Page) -> Result<TransactionPage> {
        self.club_repository.get_club(&filter.club_id)?;
        if let (Some(from), Some(to)) = (filter.date_from, filter.date_to) {
            if from > to {
                return Err(Error::invalid_input(format!(
                    "Date range is empty: {} is after {}",
                    from, to
                )));
            }
        }
        self.transaction_repository
            .list(&filter, page.normalized())
    }
}

