//! Transactions module - typed requests, the processor and transaction queries.

mod transaction_processor;
mod transactions_model;
mod transactions_service;
mod transactions_traits;


pub use transaction_processor::{
    process_transaction, stock_leg_direction, ReversalTarget, StockLeg, TransactionContext,
};
pub use transactions_model::{
    NewTransaction, OptionEventDetails, Page, PostedTransaction, TradeDetails, Transaction,
    TransactionFilter, TransactionInput, TransactionPage, TransactionRequest, TransactionType,
};
pub use transactions_service::TransactionService;
pub use transactions_traits::{TransactionRepositoryTrait, TransactionServiceTrait};
