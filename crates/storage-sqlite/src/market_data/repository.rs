use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use clubfolio_core::market_data::MarketPriceProviderTrait;
use clubfolio_core::{Error, Result};

use super::model::AssetPriceDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::asset_prices;
use crate::utils::{chunk_for_sqlite, format_date, format_decimal, format_timestamp, parse_decimal};

/// Manually recorded or imported prices.
///
/// As a price provider it answers with the latest stored price on or before
/// the valuation date. Assets with no such price are left out of the answer.
pub struct PriceRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PriceRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        PriceRepository { pool, writer }
    }

    pub async fn upsert_price(
        &self,
        asset_id: &str,
        price_date: NaiveDate,
        price: Decimal,
    ) -> Result<()> {
        if price.is_sign_negative() {
            return Err(Error::invalid_input(format!(
                "Price for {} cannot be negative",
                asset_id
            )));
        }
        let row = AssetPriceDB {
            asset_id: asset_id.to_string(),
            price_date: format_date(price_date),
            price: format_decimal(price),
            updated_at: format_timestamp(Utc::now()),
        };
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::insert_into(asset_prices::table)
                    .values(&row)
                    .on_conflict((asset_prices::asset_id, asset_prices::price_date))
                    .do_update()
                    .set((
                        asset_prices::price.eq(&row.price),
                        asset_prices::updated_at.eq(&row.updated_at),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    pub fn latest_prices(
        &self,
        asset_ids: &[String],
        as_of: NaiveDate,
    ) -> Result<HashMap<String, Decimal>> {
        let mut conn = get_connection(&self.pool)?;
        let as_of = format_date(as_of);
        let mut prices = HashMap::with_capacity(asset_ids.len());

        for chunk in chunk_for_sqlite(asset_ids) {
            let rows: Vec<AssetPriceDB> = asset_prices::table
                .filter(asset_prices::asset_id.eq_any(chunk))
                .filter(asset_prices::price_date.le(&as_of))
                .select(AssetPriceDB::as_select())
                .order((asset_prices::asset_id.asc(), asset_prices::price_date.desc()))
                .load(&mut conn)
                .map_err(StorageError::from)?;

            // Rows come newest first per asset; keep the first one seen.
            for row in rows {
                if prices.contains_key(&row.asset_id) {
                    continue;
                }
                let price = parse_decimal(&row.price, "price")?;
                prices.insert(row.asset_id, price);
            }
        }

        debug!(
            "Found stored prices for {} of {} assets as of {}",
            prices.len(),
            asset_ids.len(),
            as_of
        );
        Ok(prices)
    }
}

#[async_trait]
impl MarketPriceProviderTrait for PriceRepository {
    fn name(&self) -> &str {
        "stored-prices"
    }

    async fn get_prices(
        &self,
        asset_ids: &[String],
        as_of: NaiveDate,
    ) -> Result<HashMap<String, Decimal>> {
        self.latest_prices(asset_ids, as_of)
    }
}
