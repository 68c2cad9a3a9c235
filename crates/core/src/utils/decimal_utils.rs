use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::{CASH_DECIMAL_PRECISION, UNIT_DECIMAL_PRECISION};

/// Rounds half away from zero, the ledger's HALF_UP convention.
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a cash amount to cents.
pub fn round_cash(value: Decimal) -> Decimal {
    round_half_up(value, CASH_DECIMAL_PRECISION)
}

/// Rounds a unit count or unit value to eight places.
pub fn round_units(value: Decimal) -> Decimal {
    round_half_up(value, UNIT_DECIMAL_PRECISION)
}
