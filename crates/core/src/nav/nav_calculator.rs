//! Pure NAV arithmetic.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::nav_model::{NavCalculation, PositionValuation};
use crate::clubs::{Club, Fund};
use crate::market_data::PriceSheet;
use crate::positions::Position;
use crate::utils::decimal_utils::round_units;

/// Unit value for a club value and unit count, rounded to 8 places.
///
/// Zero when no units are outstanding, whatever the club value.
pub fn unit_value_for(total_club_value: Decimal, total_units_outstanding: Decimal) -> Decimal {
    if total_units_outstanding <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round_units(total_club_value / total_units_outstanding)
}

/// Values `positions` at `prices` and adds the club's and funds' cash.
///
/// `funds` must all belong to `club`; positions of other funds are ignored.
pub fn calculate_nav(
    club: &Club,
    funds: &[Fund],
    positions: &[Position],
    prices: &PriceSheet,
    total_units_outstanding: Decimal,
    valuation_date: NaiveDate,
) -> NavCalculation {
    let mut valuations: Vec<PositionValuation> = positions
        .iter()
        .filter(|p| p.is_open() && funds.iter().any(|f| f.id == p.fund_id))
        .map(|p| {
            let price = prices.price_of(&p.asset_id);
            PositionValuation {
                fund_id: p.fund_id.clone(),
                asset_id: p.asset_id.clone(),
                quantity: p.quantity,
                price,
                market_value: p.quantity * price,
            }
        })
        .collect();
    valuations.sort_by(|a, b| (&a.fund_id, &a.asset_id).cmp(&(&b.fund_id, &b.asset_id)));

    let market_value: Decimal = valuations.iter().map(|v| v.market_value).sum();
    let brokerage_cash: Decimal = funds
        .iter()
        .filter(|f| f.club_id == club.id)
        .map(|f| f.brokerage_cash_balance)
        .sum();
    let bank_cash = club.bank_account_balance;
    let total_cash = bank_cash + brokerage_cash;
    let total_club_value = market_value + total_cash;

    let mut unpriced_asset_ids: Vec<String> = valuations
        .iter()
        .filter(|v| prices.unpriced_asset_ids.contains(&v.asset_id))
        .map(|v| v.asset_id.clone())
        .collect();
    unpriced_asset_ids.sort();
    unpriced_asset_ids.dedup();

    NavCalculation {
        club_id: club.id.clone(),
        valuation_date,
        positions: valuations,
        market_value,
        bank_cash,
        brokerage_cash,
        total_cash,
        total_club_value,
        total_units_outstanding,
        unit_value: unit_value_for(total_club_value, total_units_outstanding),
        unpriced_asset_ids,
    }
}
