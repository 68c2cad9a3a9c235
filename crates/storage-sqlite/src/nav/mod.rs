//! SQLite storage implementation for the unit value history.

mod model;
mod repository;

pub use model::UnitValueDB;
pub use repository::UnitValueRepository;
