//! SQLite storage implementation for club memberships and member transactions.

mod model;
mod repository;

pub use model::{MemberTransactionDB, MembershipDB};
pub use repository::MembershipRepository;
