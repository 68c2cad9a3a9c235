use super::assets_model::{
    Asset, AssetProfileUpdate, NewAsset, NewOptionContract, NewStock, OptionContract,
};
use crate::errors::Result;

/// Trait defining the contract for Asset repository operations.
#[async_trait::async_trait]
pub trait AssetRepositoryTrait: Send + Sync {
    /// Inserts an asset. A duplicate natural key surfaces as a unique violation.
    async fn create(&self, new_asset: NewAsset) -> Result<Asset>;
    async fn update_profile(&self, asset_id: &str, payload: AssetProfileUpdate) -> Result<Asset>;
    fn get_by_id(&self, asset_id: &str) -> Result<Asset>;
    fn list(&self) -> Result<Vec<Asset>>;
    fn list_by_asset_ids(&self, asset_ids: &[String]) -> Result<Vec<Asset>>;
    fn find_stock(&self, symbol: &str) -> Result<Option<Asset>>;
    fn find_option(&self, contract: &OptionContract) -> Result<Option<Asset>>;
}

/// Trait defining the contract for Asset service operations.
#[async_trait::async_trait]
pub trait AssetServiceTrait: Send + Sync {
    fn get_assets(&self) -> Result<Vec<Asset>>;
    fn get_asset_by_id(&self, asset_id: &str) -> Result<Asset>;
    /// Returns the stock with this symbol, creating it if needed.
    async fn get_or_create_stock(&self, stock: NewStock) -> Result<Asset>;
    /// Returns the option with these terms, creating it if needed.
    async fn get_or_create_option(&self, contract: NewOptionContract) -> Result<Asset>;
    async fn update_asset_profile(
        &self,
        asset_id: &str,
        payload: AssetProfileUpdate,
    ) -> Result<Asset>;
}
