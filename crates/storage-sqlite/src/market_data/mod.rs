//! Stored asset prices, served as the NAV price provider.

mod model;
mod repository;

pub use model::AssetPriceDB;
pub use repository::PriceRepository;
