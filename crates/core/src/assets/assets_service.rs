use log::{debug, info};
use std::sync::Arc;

use super::assets_model::{
    option_symbol, Asset, AssetProfileUpdate, AssetType, NewAsset, NewOptionContract, NewStock,
    OptionContract,
};
use super::assets_traits::{AssetRepositoryTrait, AssetServiceTrait};
use crate::errors::{Error, Result};

/// Service for managing the asset catalogue.
pub struct AssetService {
    asset_repository: Arc<dyn AssetRepositoryTrait>,
}

impl AssetService {
    pub fn new(asset_repository: Arc<dyn AssetRepositoryTrait>) -> Self {
        Self { asset_repository }
    }

    /// Inserts `new_asset`, or returns the row a concurrent writer created first.
    async fn create_or_reread<F>(&self, new_asset: NewAsset, reread: F) -> Result<Asset>
    where
        F: Fn() -> Result<Option<Asset>> + Send,
    {
        match self.asset_repository.create(new_asset).await {
            Ok(asset) => {
                info!("Created asset {} ({})", asset.symbol, asset.id);
                Ok(asset)
            }
            Err(err) if err.is_unique_violation() => {
                debug!("Asset created concurrently, re-reading: {}", err);
                reread()?.ok_or(err)
            }
            Err(err) => Err(err),
        }
    }
}

#[async_trait::async_trait]
impl AssetServiceTrait for AssetService {
    fn get_assets(&self) -> Result<Vec<Asset>> {
        self.asset_repository.list()
    }

    fn get_asset_by_id(&self, asset_id: &str) -> Result<Asset> {
        self.asset_repository.get_by_id(asset_id)
    }

    async fn get_or_create_stock(&self, stock: NewStock) -> Result<Asset> {
        let symbol = stock.symbol.trim().to_uppercase();
        if let Some(existing) = self.asset_repository.find_stock(&symbol)? {
            return Ok(existing);
        }

        let new_asset = NewAsset {
            id: None,
            asset_type: AssetType::Stock,
            symbol: symbol.clone(),
            name: stock.name,
            currency: stock.currency.trim().to_uppercase(),
            option: None,
        };
        new_asset.validate()?;

        let repository = Arc::clone(&self.asset_repository);
        self.create_or_reread(new_asset, move || repository.find_stock(&symbol))
            .await
    }

    async fn get_or_create_option(&self, request: NewOptionContract) -> Result<Asset> {
        let underlying = self
            .asset_repository
            .get_by_id(&request.underlying_asset_id)?;
        if underlying.asset_type != AssetType::Stock {
            return Err(Error::invalid_input(format!(
                "Underlying asset {} is not a stock",
                underlying.id
            )));
        }

        let contract = OptionContract {
            underlying_asset_id: underlying.id.clone(),
            option_type: request.option_type,
            strike_price: request.strike_price,
            expiration_date: request.expiration_date,
        };
        if let Some(existing) = self.asset_repository.find_option(&contract)? {
            return Ok(existing);
        }

        let new_asset = NewAsset {
            id: None,
            asset_type: AssetType::Option,
            symbol: option_symbol(&underlying.symbol, &contract),
            name: None,
            currency: request
                .currency
                .map(|c| c.trim().to_uppercase())
                .unwrap_or_else(|| underlying.currency.clone()),
            option: Some(contract.clone()),
        };
        new_asset.validate()?;

        let repository = Arc::clone(&self.asset_repository);
        self.create_or_reread(new_asset, move || repository.find_option(&contract))
            .await
    }

    async fn update_asset_profile(
        &self,
        asset_id: &str,
        payload: AssetProfileUpdate,
    ) -> Result<Asset> {
        payload.validate()?;
        let payload = AssetProfileUpdate {
            name: payload.name.filter(|n| !n.trim().is_empty()),
            currency: payload.currency.trim().to_uppercase(),
        };
        self.asset_repository.update_profile(asset_id, payload).await
    }
}
