//! Unit arithmetic for member deposits, withdrawals and equity.

use rust_decimal::Decimal;

use crate::constants::UNIT_BALANCE_TOLERANCE;
use crate::errors::{LedgerError, Result};
use crate::nav::UnitValueHistory;
use crate::utils::decimal_utils::{round_cash, round_units};

/// Unit value a deposit is priced at.
///
/// Uses the latest snapshot when units are outstanding in it, and the
/// bootstrap value when there is no snapshot or the snapshot had no units.
pub fn deposit_unit_value(
    latest: Option<&UnitValueHistory>,
    bootstrap_unit_value: Decimal,
) -> Result<Decimal> {
    match latest {
        None => Ok(bootstrap_unit_value),
        Some(snapshot) if snapshot.total_units_outstanding <= Decimal::ZERO => {
            Ok(bootstrap_unit_value)
        }
        Some(snapshot) if snapshot.unit_value <= Decimal::ZERO => {
            Err(LedgerError::PreconditionFailed(format!(
                "unit value on {} is {}, cannot issue units",
                snapshot.valuation_date, snapshot.unit_value
            ))
            .into())
        }
        Some(snapshot) => Ok(snapshot.unit_value),
    }
}

/// Units bought or redeemed by `amount` of cash, rounded to 8 places.
pub fn units_for_amount(amount: Decimal, unit_value: Decimal) -> Result<Decimal> {
    if unit_value <= Decimal::ZERO {
        return Err(LedgerError::PreconditionFailed(format!(
            "unit value must be positive, got {}",
            unit_value
        ))
        .into());
    }
    Ok(round_units(amount / unit_value))
}

/// Cash value of `units` at `unit_value`, rounded to cents.
pub fn amount_for_units(units: Decimal, unit_value: Decimal) -> Decimal {
    round_cash(units * unit_value)
}

/// Equity of a unit balance; zero for non-positive balances.
pub fn equity_value(units: Decimal, unit_value: Decimal) -> Decimal {
    if units <= Decimal::ZERO || unit_value <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    amount_for_units(units, unit_value)
}

/// True when a balance is zero within the unit tolerance.
pub fn is_zero_balance(units: Decimal) -> bool {
    units.abs() < UNIT_BALANCE_TOLERANCE
}
