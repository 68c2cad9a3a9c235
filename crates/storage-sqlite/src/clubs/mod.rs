//! SQLite storage implementation for clubs, funds and fund splits.

mod model;
mod repository;

pub use model::{ClubDB, FundDB, FundSplitDB};
pub use repository::ClubRepository;
