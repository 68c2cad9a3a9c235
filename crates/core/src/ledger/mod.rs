//! Ledger module - atomic postings of balance, position and transaction writes.

mod ledger_book;
mod ledger_model;
mod ledger_traits;
mod retry;

pub use ledger_book::LedgerBook;
pub use ledger_model::{
    ClubBalanceChange, FundBalanceChange, LedgerPosting, MemberTransactionChange, PositionChange,
};
pub use ledger_traits::LedgerRepositoryTrait;
pub use retry::retry_on_stale_write;
