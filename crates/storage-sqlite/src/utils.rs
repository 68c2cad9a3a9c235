//! Utility functions for SQLite storage operations.
//!
//! Chunking helpers to stay under SQLite's parameter limit, and the TEXT
//! encodings used for decimals, dates and timestamps.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::errors::StorageError;
use clubfolio_core::Result;

/// Maximum number of parameters for SQLite IN (...) queries.
///
/// SQLite has a compile-time limit on the number of parameters in a SQL statement,
/// typically around 999 (SQLITE_MAX_VARIABLE_NUMBER). To stay safely under this limit
/// and leave room for other parameters in the query, we use 500 as our chunk size.
pub const SQLITE_MAX_PARAMS_CHUNK: usize = 500;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Chunk a slice into smaller slices for batch SQLite queries.
pub fn chunk_for_sqlite<T>(items: &[T]) -> impl Iterator<Item = &[T]> {
    items.chunks(SQLITE_MAX_PARAMS_CHUNK)
}

pub(crate) fn corrupt(field: &'static str, value: &str) -> clubfolio_core::Error {
    StorageError::CorruptValue {
        field,
        value: value.to_string(),
    }
    .into()
}

/// Decimals are written in their plain string form, without trailing zeros
/// beyond the value's own scale.
pub fn format_decimal(value: Decimal) -> String {
    value.to_string()
}

/// Canonical text for a decimal used in a unique key, so 150 and 150.00 collide.
pub fn format_decimal_key(value: Decimal) -> String {
    value.normalize().to_string()
}

pub fn parse_decimal(value: &str, field: &'static str) -> Result<Decimal> {
    Decimal::from_str(value).map_err(|_| corrupt(field, value))
}

pub fn parse_optional_decimal(value: Option<&str>, field: &'static str) -> Result<Option<Decimal>> {
    value.map(|v| parse_decimal(v, field)).transpose()
}

pub fn format_date(value: NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str, field: &'static str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| corrupt(field, value))
}

/// Fixed-width UTC timestamps sort lexically in time order.
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(value: &str, field: &'static str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| corrupt(field, value))
}

/// Parses a stored enum code with the domain type's `FromStr`.
pub fn parse_code<T: FromStr>(value: &str, field: &'static str) -> Result<T> {
    T::from_str(value).map_err(|_| corrupt(field, value))
}
