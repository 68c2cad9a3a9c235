//! NAV module - club valuation and the per-unit value history.

mod nav_calculator;
mod nav_model;
mod nav_service;
mod nav_traits;

#[cfg(test)]
mod nav_service_tests;

pub use nav_calculator::{calculate_nav, unit_value_for};
pub use nav_model::{
    NavCalculation, NewUnitValue, PositionValuation, UnitValueHistory, ValuationState,
};
pub use nav_service::NavService;
pub use nav_traits::{NavServiceTrait, UnitValueRepositoryTrait};
