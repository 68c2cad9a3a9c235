//! SQLite implementation of the ledger committer.

mod repository;

pub use repository::LedgerRepository;
