//! Positions module - per-(fund, asset) quantity and average cost basis.

mod position_ledger;
mod positions_model;
mod positions_service;
mod positions_traits;

pub use position_ledger::apply_quantity_change;
pub use positions_model::{Holding, Position};
pub use positions_service::PositionService;
pub use positions_traits::{PositionRepositoryTrait, PositionServiceTrait};
