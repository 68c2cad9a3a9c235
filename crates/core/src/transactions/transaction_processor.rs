//! Plans the ledger effects of one transaction.
//!
//! Planning runs against a [`LedgerBook`] and performs every precondition
//! check before the caller commits the resulting posting, so a failing
//! transaction never writes anything.

use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use super::transactions_model::{
    NewTransaction, OptionEventDetails, PostedTransaction, TradeDetails, Transaction,
    TransactionRequest, TransactionType,
};
use crate::assets::{Asset, AssetType, OptionType};
use crate::clubs::{distribute, FundSplit};
use crate::constants::SHARES_PER_CONTRACT;
use crate::errors::{Error, LedgerError, Result};
use crate::ledger::LedgerBook;

/// A transaction targeted by a REVERSAL.
#[derive(Debug, Clone)]
pub struct ReversalTarget {
    pub transaction: Transaction,
    pub already_reversed: bool,
}

/// Reference data a transaction may need besides balances and positions.
#[derive(Debug, Clone, Default)]
pub struct TransactionContext {
    pub assets: HashMap<String, Asset>,
    pub fund_splits: Vec<FundSplit>,
    pub reversal_target: Option<ReversalTarget>,
}

impl TransactionContext {
    fn asset(&self, asset_id: &str) -> Result<&Asset> {
        self.assets
            .get(asset_id)
            .ok_or_else(|| Error::not_found("Asset", asset_id))
    }
}

/// Direction of the stock leg generated by an option exercise or assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockLeg {
    Buy,
    Sell,
}

/// Exercising a call or being assigned on a put buys the underlying.
pub fn stock_leg_direction(event: TransactionType, option_type: OptionType) -> Result<StockLeg> {
    match (event, option_type) {
        (TransactionType::OptionExercise, OptionType::Call)
        | (TransactionType::OptionAssignment, OptionType::Put) => Ok(StockLeg::Buy),
        (TransactionType::OptionExercise, OptionType::Put)
        | (TransactionType::OptionAssignment, OptionType::Call) => Ok(StockLeg::Sell),
        (other, _) => Err(Error::Unexpected(format!(
            "{} does not deliver the underlying",
            other
        ))),
    }
}

/// Applies `new` to `book` and returns the rows it records.
pub fn process_transaction(
    book: &mut LedgerBook,
    context: &TransactionContext,
    new: &NewTransaction,
) -> Result<PostedTransaction> {
    let mut unallocated_amount = Decimal::ZERO;

    match &new.request {
        TransactionRequest::Buy(trade) => buy(book, context, new, trade)?,
        TransactionRequest::Sell(trade) => sell(book, context, new, trade)?,
        TransactionRequest::Dividend {
            fund_id,
            asset_id,
            amount,
        } => {
            let asset = context.asset(asset_id)?;
            if asset.asset_type != AssetType::Stock {
                return Err(Error::invalid_input(format!(
                    "Dividends can only be received on stocks, asset {} is an option",
                    asset.id
                )));
            }
            book.credit_fund(fund_id, *amount)?;
            let mut row = new_row(book, new, TransactionType::Dividend, *amount);
            row.fund_id = Some(fund_id.clone());
            row.asset_id = Some(asset_id.clone());
            book.record(row);
        }
        TransactionRequest::BrokerageInterest { fund_id, amount } => {
            book.credit_fund(fund_id, *amount)?;
            let mut row = new_row(book, new, TransactionType::BrokerageInterest, *amount);
            row.fund_id = Some(fund_id.clone());
            book.record(row);
        }
        TransactionRequest::BankInterest { amount } => {
            book.credit_bank(*amount);
            let row = new_row(book, new, TransactionType::BankInterest, *amount);
            book.record(row);
        }
        TransactionRequest::ClubExpense { amount } => {
            book.debit_bank(*amount)?;
            let row = new_row(book, new, TransactionType::ClubExpense, *amount);
            book.record(row);
        }
        TransactionRequest::BankToBrokerage { amount, fees } => {
            unallocated_amount = bank_to_brokerage(book, context, new, *amount, *fees)?;
        }
        TransactionRequest::BrokerageToBank {
            fund_id,
            amount,
            fees,
        } => {
            book.debit_fund(fund_id, *amount + *fees)?;
            book.credit_bank(*amount);
            let mut row = new_row(book, new, TransactionType::BrokerageToBank, *amount);
            row.fund_id = Some(fund_id.clone());
            row.fees = *fees;
            book.record(row);
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
            book.fund(target_fund_id)?;
            book.debit_fund(source_fund_id, *amount + *fees)?;
            book.credit_fund(target_fund_id, *amount)?;

            let mut source = new_row(book, new, TransactionType::InterfundCashTransfer, *amount);
            source.fund_id = Some(source_fund_id.clone());
            source.fees = *fees;
            let mut target = new_row(book, new, TransactionType::InterfundCashTransfer, *amount);
            target.fund_id = Some(target_fund_id.clone());
            target.related_transaction_id = Some(source.id.clone());
            book.record(source);
            book.record(target);
        }
        TransactionRequest::OptionExpiration(event) => {
            option_event(book, context, new, TransactionType::OptionExpiration, event)?
        }
        TransactionRequest::OptionExercise(event) => {
            option_event(book, context, new, TransactionType::OptionExercise, event)?
        }
        TransactionRequest::OptionAssignment(event) => {
            option_event(book, context, new, TransactionType::OptionAssignment, event)?
        }
        TransactionRequest::Adjustment { fund_id, amount } => {
            adjust_cash(book, fund_id.as_deref(), *amount)?;
            let mut row = new_row(book, new, TransactionType::Adjustment, *amount);
            row.fund_id = fund_id.clone();
            book.record(row);
        }
        TransactionRequest::Reversal { transaction_id } => {
            reverse(book, context, new, transaction_id)?
        }
    }

    let mut rows = book.recorded().iter().cloned();
    let transaction = rows
        .next()
        .ok_or_else(|| Error::Unexpected("transaction produced no rows".to_string()))?;
    Ok(PostedTransaction {
        transaction,
        linked: rows.collect(),
        unallocated_amount,
    })
}

fn new_row(
    book: &LedgerBook,
    new: &NewTransaction,
    transaction_type: TransactionType,
    total_amount: Decimal,
) -> Transaction {
    Transaction {
        id: Uuid::new_v4().to_string(),
        club_id: book.club().id.clone(),
        fund_id: None,
        asset_id: None,
        transaction_type,
        transaction_date: new.transaction_date,
        quantity: None,
        price_per_unit: None,
        total_amount,
        fees: Decimal::ZERO,
        description: new.description.clone(),
        related_transaction_id: None,
        reverses_transaction_id: None,
        created_at: book.now(),
    }
}

fn trade_row(
    book: &LedgerBook,
    new: &NewTransaction,
    transaction_type: TransactionType,
    trade: &TradeDetails,
    gross: Decimal,
) -> Transaction {
    let mut row = new_row(book, new, transaction_type, gross);
    row.fund_id = Some(trade.fund_id.clone());
    row.asset_id = Some(trade.asset_id.clone());
    row.quantity = Some(trade.quantity);
    row.price_per_unit = Some(trade.price_per_unit);
    row.fees = trade.fees;
    row
}

/// Moves `net` into (positive) or out of (negative) a fund's cash.
fn settle_fund(book: &mut LedgerBook, fund_id: &str, net: Decimal) -> Result<()> {
    if net >= Decimal::ZERO {
        book.credit_fund(fund_id, net)
    } else {
        book.debit_fund(fund_id, -net)
    }
}

fn adjust_cash(book: &mut LedgerBook, fund_id: Option<&str>, amount: Decimal) -> Result<()> {
    match fund_id {
        Some(fund_id) => settle_fund(book, fund_id, amount),
        None if amount >= Decimal::ZERO => {
            book.credit_bank(amount);
            Ok(())
        }
        None => book.debit_bank(-amount),
    }
}

fn buy(
    book: &mut LedgerBook,
    context: &TransactionContext,
    new: &NewTransaction,
    trade: &TradeDetails,
) -> Result<()> {
    book.fund(&trade.fund_id)?;
    context.asset(&trade.asset_id)?;
    let gross = trade.quantity * trade.price_per_unit;
    book.debit_fund(&trade.fund_id, gross + trade.fees)?;
    book.change_position(
        &trade.fund_id,
        &trade.asset_id,
        trade.quantity,
        trade.price_per_unit,
    )?;
    let row = trade_row(book, new, TransactionType::Buy, trade, gross);
    book.record(row);
    Ok(())
}

fn sell(
    book: &mut LedgerBook,
    context: &TransactionContext,
    new: &NewTransaction,
    trade: &TradeDetails,
) -> Result<()> {
    book.fund(&trade.fund_id)?;
    context.asset(&trade.asset_id)?;
    book.change_position(
        &trade.fund_id,
        &trade.asset_id,
        -trade.quantity,
        trade.price_per_unit,
    )?;
    let gross = trade.quantity * trade.price_per_unit;
    settle_fund(book, &trade.fund_id, gross - trade.fees)?;
    let row = trade_row(book, new, TransactionType::Sell, trade, gross);
    book.record(row);
    Ok(())
}

/// Returns the portion of `amount` left in the bank.
fn bank_to_brokerage(
    book: &mut LedgerBook,
    context: &TransactionContext,
    new: &NewTransaction,
    amount: Decimal,
    fees: Decimal,
) -> Result<Decimal> {
    if book.bank_balance() < amount + fees {
        return Err(LedgerError::InsufficientFunds {
            account: format!("club {} bank account", book.club().id),
            available: book.bank_balance(),
            required: amount + fees,
        }
        .into());
    }

    let distribution = distribute(amount, &context.fund_splits)?;
    if distribution
        .allocations
        .iter()
        .any(|a| a.amount < Decimal::ZERO)
    {
        return Err(Error::invalid_input(format!(
            "Amount {} is too small to split across {} funds",
            amount,
            distribution.allocations.len()
        )));
    }

    let allocated = distribution.allocated_total();
    if allocated.is_zero() {
        return Err(Error::invalid_input(format!(
            "Amount {} is too small to split across funds",
            amount
        )));
    }
    book.debit_bank(allocated + fees)?;

    let mut first_row_id: Option<String> = None;
    for allocation in distribution.allocations.iter().filter(|a| !a.amount.is_zero()) {
        book.credit_fund(&allocation.fund_id, allocation.amount)?;
        let mut row = new_row(book, new, TransactionType::BankToBrokerage, allocation.amount);
        row.fund_id = Some(allocation.fund_id.clone());
        match &first_row_id {
            None => {
                row.fees = fees;
                first_row_id = Some(row.id.clone());
            }
            Some(first) => row.related_transaction_id = Some(first.clone()),
        }
        book.record(row);
    }
    Ok(distribution.remainder)
}

fn option_event(
    book: &mut LedgerBook,
    context: &TransactionContext,
    new: &NewTransaction,
    event_type: TransactionType,
    event: &OptionEventDetails,
) -> Result<()> {
    book.fund(&event.fund_id)?;
    let option = context.asset(&event.asset_id)?;
    if option.asset_type != AssetType::Option {
        return Err(Error::invalid_input(format!(
            "{} requires an option asset, {} is a stock",
            event_type, option.id
        )));
    }
    let contract = option.option_contract()?.clone();

    let (held, average_cost) = book
        .position(&event.fund_id, &event.asset_id)
        .map(|p| (p.quantity, p.average_cost_basis))
        .unwrap_or((Decimal::ZERO, Decimal::ZERO));
    if held.is_zero() || event.quantity > held.abs() {
        return Err(LedgerError::InsufficientQuantity {
            fund_id: event.fund_id.clone(),
            asset_id: event.asset_id.clone(),
            held,
            requested: event.quantity,
        }
        .into());
    }

    // Move toward zero whichever side the position is on.
    let delta = if held < Decimal::ZERO {
        event.quantity
    } else {
        -event.quantity
    };
    book.change_position(&event.fund_id, &event.asset_id, delta, average_cost)?;

    let mut primary = new_row(book, new, event_type, Decimal::ZERO);
    primary.fund_id = Some(event.fund_id.clone());
    primary.asset_id = Some(event.asset_id.clone());
    primary.quantity = Some(event.quantity);

    if event_type == TransactionType::OptionExpiration {
        book.record(primary);
        return Ok(());
    }

    let underlying = context.asset(&contract.underlying_asset_id)?;
    let shares = event.quantity * SHARES_PER_CONTRACT;
    let strike = contract.strike_price;
    let notional = shares * strike;

    let leg_type = match stock_leg_direction(event_type, contract.option_type)? {
        StockLeg::Buy => {
            book.debit_fund(&event.fund_id, notional)?;
            book.change_position(&event.fund_id, &underlying.id, shares, strike)?;
            TransactionType::Buy
        }
        StockLeg::Sell => {
            book.change_position(&event.fund_id, &underlying.id, -shares, strike)?;
            book.credit_fund(&event.fund_id, notional)?;
            TransactionType::Sell
        }
    };

    let mut leg = new_row(book, new, leg_type, notional);
    leg.fund_id = Some(event.fund_id.clone());
    leg.asset_id = Some(underlying.id.clone());
    leg.quantity = Some(shares);
    leg.price_per_unit = Some(strike);
    leg.related_transaction_id = Some(primary.id.clone());
    book.record(primary);
    book.record(leg);
    Ok(())
}

fn reverse(
    book: &mut LedgerBook,
    context: &TransactionContext,
    new: &NewTransaction,
    transaction_id: &str,
) -> Result<()> {
    let target = context
        .reversal_target
        .as_ref()
        .filter(|t| t.transaction.id == transaction_id && t.transaction.club_id == book.club().id)
        .ok_or_else(|| Error::not_found("Transaction", transaction_id))?;
    if target.already_reversed {
        return Err(LedgerError::AlreadyReversed(transaction_id.to_string()).into());
    }
    let original = &target.transaction;
    if !original.transaction_type.is_reversible() {
        return Err(Error::invalid_input(format!(
            "{} transactions cannot be reversed; post an ADJUSTMENT instead",
            original.transaction_type
        )));
    }
    if let Some(parent) = &original.related_transaction_id {
        return Err(Error::invalid_input(format!(
            "Transaction {} is linked to {} and cannot be reversed on its own",
            original.id, parent
        )));
    }

    let fund_id = original.fund_id.as_deref();
    match original.transaction_type {
        TransactionType::Buy | TransactionType::Sell => {
            let (fund_id, asset_id, quantity, price) = match (
                fund_id,
                original.asset_id.as_deref(),
                original.quantity,
                original.price_per_unit,
            ) {
                (Some(f), Some(a), Some(q), Some(p)) => (f, a, q, p),
                _ => {
                    return Err(Error::Unexpected(format!(
                        "trade {} is missing fund, asset, quantity or price",
                        original.id
                    )))
                }
            };
            if original.transaction_type == TransactionType::Buy {
                book.change_position(fund_id, asset_id, -quantity, price)?;
                book.credit_fund(fund_id, original.total_amount + original.fees)?;
            } else {
                // Re-adding at the current average keeps the average unchanged.
                let average_cost = book
                    .position(fund_id, asset_id)
                    .map(|p| p.average_cost_basis)
                    .unwrap_or(price);
                settle_fund(book, fund_id, original.fees - original.total_amount)?;
                book.change_position(fund_id, asset_id, quantity, average_cost)?;
            }
        }
        TransactionType::Dividend | TransactionType::BrokerageInterest => {
            let fund_id = fund_id.ok_or_else(|| {
                Error::Unexpected(format!("income {} has no fund", original.id))
            })?;
            book.debit_fund(fund_id, original.total_amount)?;
        }
        TransactionType::BankInterest => book.debit_bank(original.total_amount)?,
        TransactionType::ClubExpense => book.credit_bank(original.total_amount),
        TransactionType::Adjustment => adjust_cash(book, fund_id, -original.total_amount)?,
        other => {
            return Err(Error::Unexpected(format!("{} is not reversible", other)));
        }
    }

    let mut row = new_row(book, new, TransactionType::Reversal, original.total_amount);
    row.fund_id = original.fund_id.clone();
    row.asset_id = original.asset_id.clone();
    row.quantity = original.quantity;
    row.price_per_unit = original.price_per_unit;
    row.fees = original.fees;
    row.reverses_transaction_id = Some(original.id.clone());
    if row.description.is_none() {
        row.description = Some(format!(
            "Reversal of {} {}",
            original.transaction_type, original.id
        ));
    }
    book.record(row);
    Ok(())
}
