//! Allocation of a club-level cash inflow across funds.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::clubs_model::FundSplit;
use crate::errors::{LedgerError, Result};
use crate::utils::decimal_utils::round_cash;

/// Cash routed to one fund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitAllocation {
    pub fund_id: String,
    pub amount: Decimal,
}

/// Result of distributing an amount over a split set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitDistribution {
    pub allocations: Vec<SplitAllocation>,
    /// Portion not covered by the split percentages (Σ < 1). Stays with the caller.
    pub remainder: Decimal,
}

impl SplitDistribution {
    pub fn allocated_total(&self) -> Decimal {
        self.allocations.iter().map(|a| a.amount).sum()
    }
}

/// Checks that a split set is usable and returns the sum of its percentages.
pub fn validate_splits(splits: &[FundSplit]) -> Result<Decimal> {
    if splits.is_empty() {
        return Err(LedgerError::InvalidSplitConfiguration(
            "no fund splits configured".to_string(),
        )
        .into());
    }

    let mut total = Decimal::ZERO;
    for split in splits {
        if split.split_percentage <= Decimal::ZERO || split.split_percentage > Decimal::ONE {
            return Err(LedgerError::InvalidSplitConfiguration(format!(
                "split for fund {} must be in (0, 1], got {}",
                split.fund_id, split.split_percentage
            ))
            .into());
        }
        total += split.split_percentage;
    }

    if total > Decimal::ONE {
        return Err(LedgerError::InvalidSplitConfiguration(format!(
            "splits sum to {}, exceeding 100%",
            total
        ))
        .into());
    }
    Ok(total)
}

/// Splits `total_amount` across funds in input order.
///
/// Each share is rounded to cents HALF_UP. The last share absorbs the rounding
/// drift so that the allocations add up exactly to the covered portion of the
/// amount; any uncovered portion is returned as `remainder`.
pub fn distribute(total_amount: Decimal, splits: &[FundSplit]) -> Result<SplitDistribution> {
    let percentage_total = validate_splits(splits)?;

    let target = if percentage_total == Decimal::ONE {
        total_amount
    } else {
        round_cash(total_amount * percentage_total)
    };

    let mut running_sum = Decimal::ZERO;
    let mut allocations: Vec<SplitAllocation> = splits
        .iter()
        .map(|split| {
            let amount = round_cash(total_amount * split.split_percentage);
            running_sum += amount;
            SplitAllocation {
                fund_id: split.fund_id.clone(),
                amount,
            }
        })
        .collect();

    if let Some(last) = allocations.last_mut() {
        last.amount -= running_sum - target;
    }

    Ok(SplitDistribution {
        allocations,
        remainder: total_amount - target,
    })
}
