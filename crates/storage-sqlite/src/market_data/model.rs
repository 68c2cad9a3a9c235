//! Database model for stored asset prices.

use diesel::prelude::*;

/// One closing price per asset and date. Re-recording a date replaces it.
#[derive(Queryable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::asset_prices)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AssetPriceDB {
    pub asset_id: String,
    pub price_date: String,
    pub price: String,
    pub updated_at: String,
}
