//! Weighted-average cost basis bookkeeping for a single position.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::positions_model::Position;
use crate::errors::{Error, LedgerError, Result};
use crate::ledger::PositionChange;

/// Applies a signed quantity change to the `(fund_id, asset_id)` position.
///
/// `existing` is the current row, if any. A position can only be opened by a
/// positive delta, and the resulting quantity can never be negative. The
/// average cost is recomputed for increases and left untouched for
/// reductions. Returns the row to persist together with the version the
/// write must match.
pub fn apply_quantity_change(
    existing: Option<&Position>,
    fund_id: &str,
    asset_id: &str,
    delta: Decimal,
    price_per_unit: Decimal,
    now: DateTime<Utc>,
) -> Result<PositionChange> {
    if delta.is_zero() {
        return Err(Error::invalid_input("Quantity change cannot be zero"));
    }

    let Some(current) = existing else {
        if delta < Decimal::ZERO {
            return Err(LedgerError::InvalidOperation(format!(
                "cannot open a position in asset {} of fund {} with a reduction",
                asset_id, fund_id
            ))
            .into());
        }
        let position = Position {
            id: Uuid::new_v4().to_string(),
            fund_id: fund_id.to_string(),
            asset_id: asset_id.to_string(),
            quantity: delta,
            average_cost_basis: price_per_unit,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        return Ok(PositionChange {
            position,
            expected_version: None,
        });
    };

    let new_quantity = current.quantity + delta;
    if new_quantity < Decimal::ZERO {
        return Err(LedgerError::InsufficientQuantity {
            fund_id: fund_id.to_string(),
            asset_id: asset_id.to_string(),
            held: current.quantity,
            requested: -delta,
        }
        .into());
    }

    let average_cost_basis = if delta > Decimal::ZERO {
        if new_quantity.is_zero() {
            Decimal::ZERO
        } else {
            (current.average_cost_basis * current.quantity + price_per_unit * delta) / new_quantity
        }
    } else {
        current.average_cost_basis
    };

    let position = Position {
        quantity: new_quantity,
        average_cost_basis,
        version: current.version + 1,
        updated_at: now,
        ..current.clone()
    };
    Ok(PositionChange {
        position,
        expected_version: Some(current.version),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use rust_decimal_macros::dec;

    fn open(quantity: Decimal, cost: Decimal) -> Position {
        apply_quantity_change(None, "fund-1", "aapl", quantity, cost, Utc::now())
            .unwrap()
            .position
    }

    #[test]
    fn first_buy_opens_at_price() {
        let change =
            apply_quantity_change(None, "fund-1", "aapl", dec!(50), dec!(150), Utc::now()).unwrap();
        assert_eq!(change.expected_version, None);
        assert_eq!(change.position.quantity, dec!(50));
        assert_eq!(change.position.average_cost_basis, dec!(150));
        assert_eq!(change.position.version, 0);
    }

    #[test]
    fn opening_with_a_sell_is_rejected() {
        let err = apply_quantity_change(None, "fund-1", "aapl", dec!(-5), dec!(150), Utc::now())
            .unwrap_err();
        assert!(matches!(err, Error::Ledger(LedgerError::InvalidOperation(_))));
        assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
    }

    #[test]
    fn second_buy_averages_cost() {
        let position = open(dec!(10), dec!(100));
        let change = apply_quantity_change(
            Some(&position),
            "fund-1",
            "aapl",
            dec!(30),
            dec!(120),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(change.expected_version, Some(0));
        assert_eq!(change.position.id, position.id);
        assert_eq!(change.position.quantity, dec!(40));
        assert_eq!(change.position.average_cost_basis, dec!(115));
        assert_eq!(change.position.version, 1);
    }

    #[test]
    fn sell_keeps_cost_basis() {
        let position = open(dec!(40), dec!(115));
        let change = apply_quantity_change(
            Some(&position),
            "fund-1",
            "aapl",
            dec!(-15),
            dec!(200),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(change.position.quantity, dec!(25));
        assert_eq!(change.position.average_cost_basis, dec!(115));
    }

    #[test]
    fn selling_everything_leaves_a_zero_row() {
        let position = open(dec!(5), dec!(10));
        let change = apply_quantity_change(
            Some(&position),
            "fund-1",
            "aapl",
            dec!(-5),
            dec!(12),
            Utc::now(),
        )
        .unwrap();
        assert!(change.position.quantity.is_zero());
        assert!(!change.position.is_open());
    }

    #[test]
    fn overselling_is_insufficient_quantity() {
        let position = open(dec!(5), dec!(10));
        let err = apply_quantity_change(
            Some(&position),
            "fund-1",
            "aapl",
            dec!(-6),
            dec!(12),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientQuantity);
        match err {
            Error::Ledger(LedgerError::InsufficientQuantity {
                held, requested, ..
            }) => {
                assert_eq!(held, dec!(5));
                assert_eq!(requested, dec!(6));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn zero_delta_is_invalid_input() {
        let err = apply_quantity_change(None, "fund-1", "aapl", Decimal::ZERO, dec!(1), Utc::now())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
