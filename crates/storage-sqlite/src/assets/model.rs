//! Database model for stocks and option contracts.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::utils::{
    corrupt, format_date, format_decimal_key, format_timestamp, parse_date, parse_decimal,
    parse_timestamp,
};
use clubfolio_core::assets::{Asset, AssetType, NewAsset, OptionContract, OptionType};
use clubfolio_core::Error;

/// Database model for assets. The option columns are all set for an
/// option and all null for a stock.
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::assets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AssetDB {
    pub id: String,
    pub asset_type: String,
    pub symbol: String,
    pub name: Option<String>,
    pub currency: String,
    pub underlying_asset_id: Option<String>,
    pub option_type: Option<String>,
    pub strike_price: Option<String>,
    pub expiration_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl AssetDB {
    pub fn from_new(id: String, new_asset: NewAsset, now: DateTime<Utc>) -> Self {
        let now = format_timestamp(now);
        let option = new_asset.option;
        Self {
            id,
            asset_type: new_asset.asset_type.as_db_str().to_string(),
            symbol: new_asset.symbol,
            name: new_asset.name,
            currency: new_asset.currency,
            underlying_asset_id: option.as_ref().map(|o| o.underlying_asset_id.clone()),
            option_type: option
                .as_ref()
                .map(|o| o.option_type.as_db_str().to_string()),
            strike_price: option.as_ref().map(|o| format_decimal_key(o.strike_price)),
            expiration_date: option.as_ref().map(|o| format_date(o.expiration_date)),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

impl TryFrom<AssetDB> for Asset {
    type Error = Error;

    fn try_from(db: AssetDB) -> Result<Self, Self::Error> {
        let asset_type = AssetType::from_db_str(&db.asset_type)
            .ok_or_else(|| corrupt("asset_type", &db.asset_type))?;

        let option = match (
            db.underlying_asset_id,
            db.option_type,
            db.strike_price,
            db.expiration_date,
        ) {
            (Some(underlying_asset_id), Some(option_type), Some(strike), Some(expiration)) => {
                Some(OptionContract {
                    underlying_asset_id,
                    option_type: OptionType::from_db_str(&option_type)
                        .ok_or_else(|| corrupt("option_type", &option_type))?,
                    strike_price: parse_decimal(&strike, "strike_price")?,
                    expiration_date: parse_date(&expiration, "expiration_date")?,
                })
            }
            (None, None, None, None) => None,
            _ => return Err(corrupt("option", &db.id)),
        };

        if option.is_some() != (asset_type == AssetType::Option) {
            return Err(corrupt("asset_type", &db.asset_type));
        }

        Ok(Self {
            id: db.id,
            asset_type,
            symbol: db.symbol,
            name: db.name,
            currency: db.currency,
            option,
            created_at: parse_timestamp(&db.created_at, "created_at")?,
            updated_at: parse_timestamp(&db.updated_at, "updated_at")?,
        })
    }
}
