use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use clubfolio_core::assets::{
    Asset, AssetProfileUpdate, AssetRepositoryTrait, AssetType, NewAsset, OptionContract,
};
use clubfolio_core::Result;

use super::model::AssetDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{not_found_as, StorageError};
use crate::schema::assets;
use crate::utils::{chunk_for_sqlite, format_date, format_decimal_key, format_timestamp};

pub struct AssetRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl AssetRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        AssetRepository { pool, writer }
    }
}

fn load_asset(conn: &mut SqliteConnection, asset_id: &str) -> Result<Asset> {
    not_found_as(
        assets::table
            .find(asset_id)
            .select(AssetDB::as_select())
            .first(conn),
        "Asset",
        asset_id,
    )?
    .try_into()
}

fn into_assets(rows: Vec<AssetDB>) -> Result<Vec<Asset>> {
    rows.into_iter().map(Asset::try_from).collect()
}

#[async_trait]
impl AssetRepositoryTrait for AssetRepository {
    /// Inserts a new asset. A second stock with the same symbol, or a second
    /// option with the same contract terms, fails with a unique violation.
    async fn create(&self, new_asset: NewAsset) -> Result<Asset> {
        let id = new_asset
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let asset_db = AssetDB::from_new(id, new_asset, Utc::now());

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Asset> {
                let inserted = diesel::insert_into(assets::table)
                    .values(&asset_db)
                    .returning(AssetDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                inserted.try_into()
            })
            .await
    }

    async fn update_profile(&self, asset_id: &str, payload: AssetProfileUpdate) -> Result<Asset> {
        let asset_id = asset_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Asset> {
                let updated = diesel::update(assets::table.find(&asset_id))
                    .set((
                        assets::name.eq(payload.name),
                        assets::currency.eq(payload.currency),
                        assets::updated_at.eq(format_timestamp(Utc::now())),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if updated == 0 {
                    return Err(clubfolio_core::Error::not_found("Asset", asset_id));
                }
                load_asset(conn, &asset_id)
            })
            .await
    }

    fn get_by_id(&self, asset_id: &str) -> Result<Asset> {
        let mut conn = get_connection(&self.pool)?;
        load_asset(&mut conn, asset_id)
    }

    fn list(&self) -> Result<Vec<Asset>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = assets::table
            .select(AssetDB::as_select())
            .order(assets::symbol.asc())
            .load(&mut conn)
            .map_err(StorageError::from)?;
        into_assets(rows)
    }

    fn list_by_asset_ids(&self, asset_ids: &[String]) -> Result<Vec<Asset>> {
        let mut conn = get_connection(&self.pool)?;
        let mut rows = Vec::with_capacity(asset_ids.len());
        for chunk in chunk_for_sqlite(asset_ids) {
            let chunk_rows = assets::table
                .filter(assets::id.eq_any(chunk))
                .select(AssetDB::as_select())
                .load(&mut conn)
                .map_err(StorageError::from)?;
            rows.extend(chunk_rows);
        }
        into_assets(rows)
    }

    fn find_stock(&self, symbol: &str) -> Result<Option<Asset>> {
        let mut conn = get_connection(&self.pool)?;
        assets::table
            .filter(assets::asset_type.eq(AssetType::Stock.as_db_str()))
            .filter(assets::symbol.eq(symbol))
            .select(AssetDB::as_select())
            .first(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(Asset::try_from)
            .transpose()
    }

    fn find_option(&self, contract: &OptionContract) -> Result<Option<Asset>> {
        let mut conn = get_connection(&self.pool)?;
        assets::table
            .filter(assets::asset_type.eq(AssetType::Option.as_db_str()))
            .filter(assets::underlying_asset_id.eq(&contract.underlying_asset_id))
            .filter(assets::option_type.eq(contract.option_type.as_db_str()))
            .filter(assets::strike_price.eq(format_decimal_key(contract.strike_price)))
            .filter(assets::expiration_date.eq(format_date(contract.expiration_date)))
            .select(AssetDB::as_select())
            .first(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(Asset::try_from)
            .transpose()
    }
}
