//! Clubfolio Core - Domain entities, services, and traits.
//!
//! This crate contains the accounting engine of a member-owned investment
//! club: transaction processing, positions, fund splits, NAV and unit
//! issuance. It is database-agnostic and defines traits that are
//! implemented by the `storage-sqlite` crate.

pub mod assets;
pub mod clubs;
pub mod config;
pub mod constants;
pub mod errors;
pub mod ledger;
pub mod market_data;
pub mod members;
pub mod nav;
pub mod positions;
pub mod transactions;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use config::LedgerConfig;

// Re-export error types
pub use errors::Error;
pub use errors::ErrorKind;
pub use errors::Result;
