//! SQLite storage implementation for positions.
//!
//! Positions are only written through ledger commits; this module reads them.

mod model;
mod repository;

pub use model::PositionDB;
pub use repository::PositionRepository;
