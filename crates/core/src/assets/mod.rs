//! Assets module - stocks and option contracts the club can hold.

mod assets_model;
mod assets_service;
mod assets_traits;


pub use assets_model::{
    option_symbol, Asset, AssetProfileUpdate, AssetType, NewAsset, NewOptionContract, NewStock,
    OptionContract, OptionType,
};
pub use assets_service::AssetService;
pub use assets_traits::{AssetRepositoryTrait, AssetServiceTrait};
