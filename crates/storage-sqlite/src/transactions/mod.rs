//! SQLite storage implementation for ledger transactions.

mod model;
mod repository;

pub use model::TransactionDB;
pub use repository::TransactionRepository;
