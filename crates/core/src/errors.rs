//! Core error types for the club ledger.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage layer.

use chrono::ParseError as ChronoParseError;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the ledger.
///
/// Database-specific errors are wrapped in string form to keep this type
/// database-agnostic.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Ledger rule violated: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Database-agnostic error type for storage operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A unique constraint was violated (e.g., duplicate key).
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// A versioned row changed between read and write.
    #[error("Concurrent modification: {0}")]
    ConcurrentModification(String),

    /// A foreign key constraint was violated.
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// A database transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Database migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Violations of ledger rules detected before any mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient funds in {account}: available {available}, required {required}")]
    InsufficientFunds {
        account: String,
        available: Decimal,
        required: Decimal,
    },

    #[error("insufficient quantity of asset {asset_id} in fund {fund_id}: held {held}, requested {requested}")]
    InsufficientQuantity {
        fund_id: String,
        asset_id: String,
        held: Decimal,
        requested: Decimal,
    },

    #[error("insufficient units in membership {membership_id}: held {held}, requested {requested}")]
    InsufficientUnits {
        membership_id: String,
        held: Decimal,
        requested: Decimal,
    },

    #[error("invalid fund split configuration: {0}")]
    InvalidSplitConfiguration(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("transaction {0} has already been reversed")]
    AlreadyReversed(String),
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Field '{0}' is not allowed for this transaction type")]
    ForbiddenField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

/// Error taxonomy exposed to callers of the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    InsufficientFunds,
    InsufficientQuantity,
    InvalidSplitConfiguration,
    Conflict,
    PreconditionFailed,
    Unavailable,
    Internal,
}

impl Error {
    /// Shorthand for a missing entity.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Shorthand for an `InvalidInput` validation failure.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::Validation(ValidationError::InvalidInput(message.into()))
    }

    /// Classifies the error into the caller-facing taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Validation(_) => ErrorKind::InvalidInput,
            Error::Ledger(err) => match err {
                LedgerError::InsufficientFunds { .. } | LedgerError::InsufficientUnits { .. } => {
                    ErrorKind::InsufficientFunds
                }
                LedgerError::InsufficientQuantity { .. } => ErrorKind::InsufficientQuantity,
                LedgerError::InvalidSplitConfiguration(_) => ErrorKind::InvalidSplitConfiguration,
                LedgerError::InvalidOperation(_) | LedgerError::PreconditionFailed(_) => {
                    ErrorKind::PreconditionFailed
                }
                LedgerError::AlreadyReversed(_) => ErrorKind::Conflict,
            },
            Error::MarketData(_) => ErrorKind::Unavailable,
            Error::Database(err) => match err {
                DatabaseError::NotFound(_) => ErrorKind::NotFound,
                DatabaseError::UniqueViolation(_) | DatabaseError::ConcurrentModification(_) => {
                    ErrorKind::Conflict
                }
                _ => ErrorKind::Internal,
            },
            Error::Unexpected(_) => ErrorKind::Internal,
        }
    }

    /// True when a versioned write lost a race and the operation may be re-planned.
    pub fn is_stale_write(&self) -> bool {
        matches!(
            self,
            Error::Database(DatabaseError::ConcurrentModification(_))
        )
    }

    /// True for unique-constraint violations raised by storage.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Error::Database(DatabaseError::UniqueViolation(_)))
    }
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn ledger_errors_map_to_taxonomy() {
        let funds: Error = LedgerError::InsufficientFunds {
            account: "fund f1".to_string(),
            available: dec!(10),
            required: dec!(20),
        }
        .into();
        assert_eq!(funds.kind(), ErrorKind::InsufficientFunds);

        let opening_sell: Error =
            LedgerError::InvalidOperation("cannot open with a sell".to_string()).into();
        assert_eq!(opening_sell.kind(), ErrorKind::PreconditionFailed);

        let reversed: Error = LedgerError::AlreadyReversed("tx-1".to_string()).into();
        assert_eq!(reversed.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn database_errors_map_to_taxonomy() {
        let duplicate: Error = DatabaseError::UniqueViolation("dup".to_string()).into();
        assert_eq!(duplicate.kind(), ErrorKind::Conflict);
        assert!(duplicate.is_unique_violation());
        assert!(!duplicate.is_stale_write());

        let stale: Error = DatabaseError::ConcurrentModification("fund f1".to_string()).into();
        assert_eq!(stale.kind(), ErrorKind::Conflict);
        assert!(stale.is_stale_write());

        let missing: Error = DatabaseError::NotFound("club".to_string()).into();
        assert_eq!(missing.kind(), ErrorKind::NotFound);

        let broken: Error = DatabaseError::QueryFailed("syntax".to_string()).into();
        assert_eq!(broken.kind(), ErrorKind::Internal);
    }

    #[test]
    fn provider_failures_are_unavailable() {
        let err: Error = MarketDataError::Timeout(30).into();
        assert_eq!(err.kind(), ErrorKind::Unavailable);
    }

    #[test]
    fn not_found_display_names_entity() {
        let err = Error::not_found("Fund", "f-9");
        assert_eq!(err.to_string(), "Fund not found: f-9");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
