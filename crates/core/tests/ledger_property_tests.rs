//! Property-based integration tests for the ledger arithmetic.
//!
//! These cover the position ledger, fund split distribution and unit
//! issuance, using the `proptest` crate for random test case generation.

use chrono::Utc;
use clubfolio_core::clubs::{distribute, FundSplit};
use clubfolio_core::members::{amount_for_units, units_for_amount};
use clubfolio_core::positions::{apply_quantity_change, Position};
use proptest::prelude::*;
use rust_decimal::Decimal;

// =============================================================================
// Generators
// =============================================================================

/// Quantity with up to four decimal places, in (0, 1000].
fn arb_quantity() -> impl Strategy<Value = Decimal> {
    (1i64..=10_000_000).prop_map(|n| Decimal::new(n, 4))
}

/// Price with cents, in (0, 10000].
fn arb_price() -> impl Strategy<Value = Decimal> {
    (1i64..=1_000_000).prop_map(|n| Decimal::new(n, 2))
}

/// Cash amount with cents, in (0, 1000000].
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..=100_000_000).prop_map(|n| Decimal::new(n, 2))
}

/// Unit value with eight decimal places, in [0.01, 1000].
fn arb_unit_value() -> impl Strategy<Value = Decimal> {
    (1_000_000i64..=100_000_000_000).prop_map(|n| Decimal::new(n, 8))
}

/// Split percentages in basis points that add up to 100%.
fn arb_full_splits() -> impl Strategy<Value = Vec<FundSplit>> {
    proptest::collection::btree_set(1u32..10_000, 0..6).prop_map(|cuts| {
        let mut bounds: Vec<u32> = vec![0];
        bounds.extend(cuts);
        bounds.push(10_000);
        bounds
            .windows(2)
            .enumerate()
            .map(|(i, w)| FundSplit {
                club_id: "club".to_string(),
                fund_id: format!("fund-{}", i),
                split_percentage: Decimal::new(i64::from(w[1] - w[0]), 4),
            })
            .collect()
    })
}

#[derive(Debug, Clone)]
enum Trade {
    Buy(Decimal, Decimal),
    Sell(Decimal),
}

fn arb_trades() -> impl Strategy<Value = Vec<Trade>> {
    let trade = prop_oneof![
        (arb_quantity(), arb_price()).prop_map(|(q, p)| Trade::Buy(q, p)),
        arb_quantity().prop_map(Trade::Sell),
    ];
    proptest::collection::vec(trade, 1..40)
}

fn replay(trades: &[Trade]) -> (Option<Position>, Vec<Decimal>) {
    let mut position: Option<Position> = None;
    let mut accepted = Vec::new();
    for trade in trades {
        let (delta, price) = match trade {
            Trade::Buy(q, p) => (*q, *p),
            Trade::Sell(q) => (-*q, Decimal::ONE),
        };
        if let Ok(change) =
            apply_quantity_change(position.as_ref(), "fund", "asset", delta, price, Utc::now())
        {
            position = Some(change.position);
            accepted.push(delta);
        }
    }
    (position, accepted)
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Quantity equals the sum of accepted changes and never goes negative.
    #[test]
    fn prop_quantity_is_sum_of_accepted_changes(trades in arb_trades()) {
        let (position, accepted) = replay(&trades);
        let expected: Decimal = accepted.iter().copied().sum();
        let quantity = position.map(|p| p.quantity).unwrap_or(Decimal::ZERO);
        prop_assert_eq!(quantity, expected);
        prop_assert!(quantity >= Decimal::ZERO);
    }

    /// Selling never changes the average cost.
    #[test]
    fn prop_sells_keep_average_cost(
        quantity in arb_quantity(),
        price in arb_price(),
        fraction in 1i64..=100,
    ) {
        let opened = apply_quantity_change(None, "fund", "asset", quantity, price, Utc::now())
            .unwrap()
            .position;
        let sold = quantity * Decimal::new(fraction, 2);
        let after = apply_quantity_change(Some(&opened), "fund", "asset", -sold, Decimal::ONE, Utc::now())
            .unwrap()
            .position;
        prop_assert_eq!(after.average_cost_basis, opened.average_cost_basis);
        prop_assert_eq!(after.quantity, quantity - sold);
    }

    /// After buys only, quantity x average cost equals the total paid.
    #[test]
    fn prop_buys_preserve_total_cost(
        buys in proptest::collection::vec((arb_quantity(), arb_price()), 1..20),
    ) {
        let mut position: Option<Position> = None;
        let mut paid = Decimal::ZERO;
        for (quantity, price) in &buys {
            position = Some(
                apply_quantity_change(position.as_ref(), "fund", "asset", *quantity, *price, Utc::now())
                    .unwrap()
                    .position,
            );
            paid += quantity * price;
        }
        let position = position.unwrap();
        let drift = (position.total_cost_basis() - paid).abs();
        prop_assert!(drift < Decimal::new(1, 8), "drift {} on paid {}", drift, paid);
    }

    /// Splits covering 100% allocate the whole amount, to the cent.
    #[test]
    fn prop_full_split_allocates_everything(
        amount in arb_amount(),
        splits in arb_full_splits(),
    ) {
        let distribution = distribute(amount, &splits).unwrap();
        prop_assert_eq!(distribution.allocated_total(), amount);
        prop_assert_eq!(distribution.remainder, Decimal::ZERO);
        prop_assert_eq!(distribution.allocations.len(), splits.len());
    }

    /// Units issued for a deposit redeem for the same cash at the same unit value.
    #[test]
    fn prop_deposit_withdraw_round_trip(
        amount in arb_amount(),
        unit_value in arb_unit_value(),
    ) {
        let units = units_for_amount(amount, unit_value).unwrap();
        prop_assert!(units.scale() <= 8);
        prop_assert_eq!(amount_for_units(units, unit_value), amount);
    }
}
