use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Shares delivered per option contract on exercise or assignment
pub const SHARES_PER_CONTRACT: Decimal = dec!(100);

/// Unit value used for the first deposits of a club with no valuation history
pub const BOOTSTRAP_UNIT_VALUE: Decimal = dec!(10.00000000);

/// Decimal places for unit counts and unit values
pub const UNIT_DECIMAL_PRECISION: u32 = 8;

/// Decimal places for cash amounts
pub const CASH_DECIMAL_PRECISION: u32 = 2;

/// A unit balance below this magnitude is treated as zero
pub const UNIT_BALANCE_TOLERANCE: Decimal = dec!(0.00000001);

/// Upper bound for a single page of transaction results
pub const MAX_PAGE_SIZE: i64 = 500;
