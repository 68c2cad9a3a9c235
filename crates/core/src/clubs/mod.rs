//! Clubs module - clubs, their funds, and fund split configuration.

mod clubs_model;
mod clubs_service;
mod clubs_traits;
mod fund_split_distributor;


pub use clubs_model::{Club, Fund, FundSplit, NewClub, NewFund, NewFundSplit};
pub use clubs_service::ClubService;
pub use clubs_traits::{ClubRepositoryTrait, ClubServiceTrait};
pub use fund_split_distributor::{distribute, validate_splits, SplitAllocation, SplitDistribution};
