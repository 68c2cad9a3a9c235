//! Members module - memberships, unit issuance and redemption, member equity.

mod members_model;
mod members_service;
mod members_traits;
mod unit_calculator;


pub use members_model::{
    ClubMembership, MemberCashMovement, MemberEquity, MemberRole, MemberTransaction,
    MemberTransactionType, NewMembership,
};
pub use members_service::MemberService;
pub use members_traits::{MemberServiceTrait, MembershipRepositoryTrait};
pub use unit_calculator::{
    amount_for_units, deposit_unit_value, equity_value, is_zero_balance, units_for_amount,
};
