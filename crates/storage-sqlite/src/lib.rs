//! SQLite storage implementation for Clubfolio.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `clubfolio-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for all domain entities
//! - The ledger committer that applies a posting in one transaction
//! - A price table that serves as the NAV price provider
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! `core` is database-agnostic and works with traits.
//!
//! ```text
//!       core (domain)
//!            │
//!            ▼
//!   storage-sqlite (this crate)
//!            │
//!            ▼
//!        SQLite DB
//! ```
//!
//! Every write goes through the single writer actor, so each repository
//! write and each ledger commit runs in its own immediate transaction.

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod assets;
pub mod clubs;
pub mod ledger;
pub mod market_data;
pub mod members;
pub mod nav;
pub mod positions;
pub mod transactions;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, get_db_path, init, run_migrations, spawn_writer, DbConnection,
    DbPool, WriteHandle,
};

// Re-export storage errors
pub use errors::{IntoCore, StorageError};

pub use assets::AssetRepository;
pub use clubs::ClubRepository;
pub use ledger::LedgerRepository;
pub use market_data::PriceRepository;
pub use members::MembershipRepository;
pub use nav::UnitValueRepository;
pub use positions::PositionRepository;
pub use transactions::TransactionRepository;

// Re-export core error types for convenience
pub use clubfolio_core::errors::{DatabaseError, Error, Result};
