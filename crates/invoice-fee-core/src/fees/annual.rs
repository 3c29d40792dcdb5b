//! Annual fee from tier-fixed or bracketed asset-based schedules.
//!
//! Bracket pricing is progressive: every unlapsed schedule whose minimum the
//! asset value reaches contributes, either the partial bracket the value sits
//! in or the whole bracket it has passed. Each qualifying bracket adds its
//! own fixed component.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{FeeSchedule, ProductType};
use crate::types::Money;

/// What one bracket added to the annual fee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketContribution {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_id: Option<String>,
    pub asset_size_minimum: Money,
    pub asset_size_maximum: Money,
    /// Asset amount the percentage was applied to.
    pub basis: Money,
    pub contribution: Money,
    /// The asset value exceeded this bracket's cap.
    pub full_bracket: bool,
}

/// Per-bracket contributions for asset-based pricing, in schedule order.
///
/// Lapsed schedules (ending before the billing date) and brackets whose
/// minimum the asset value does not reach are left out.
pub fn bracket_contributions(
    billing_date: NaiveDate,
    asset_value: Money,
    fee_schedules: &[FeeSchedule],
) -> Vec<BracketContribution> {
    fee_schedules
        .iter()
        .filter(|s| !s.has_lapsed(billing_date))
        .filter_map(|s| {
            let in_range = asset_value >= s.asset_size_minimum;
            let below_cap = asset_value <= s.asset_size_maximum || s.is_unbounded();
            if !in_range {
                return None;
            }
            let (basis, full_bracket) = if below_cap {
                (asset_value - s.asset_size_minimum, false)
            } else {
                (s.asset_size_maximum - s.asset_size_minimum, true)
            };
            Some(BracketContribution {
                schedule_id: s.id.clone(),
                asset_size_minimum: s.asset_size_minimum,
                asset_size_maximum: s.asset_size_maximum,
                basis,
                contribution: basis * s.annual_fee_percentage + s.annual_fee_fixed,
                full_bracket,
            })
        })
        .collect()
}

/// Fixed fee of the first schedule at `tier_level`, if any.
pub fn tier_fee(tier_level: i32, fee_schedules: &[FeeSchedule]) -> Option<Money> {
    fee_schedules
        .iter()
        .find(|s| s.tier_level == tier_level)
        .map(|s| s.annual_fee_fixed)
}

/// Annual fee for a product given its resolved fee schedules.
///
/// `schedule_as_of` is the client fee-schedule date the candidates were
/// resolved against; it is recorded for tracing only. Unmatched inputs yield
/// zero, which is a legitimate "no fee configured" result.
pub fn compute_annual_fee(
    product_type: &ProductType,
    billing_date: NaiveDate,
    schedule_as_of: NaiveDate,
    asset_value: Money,
    tier_level: i32,
    fee_schedules: &[FeeSchedule],
) -> Money {
    if product_type.is_tier_only {
        let fee = tier_fee(tier_level, fee_schedules).unwrap_or(Decimal::ZERO);
        debug!(
            product_type = product_type.id,
            tier_level,
            %schedule_as_of,
            %fee,
            "tier-only annual fee"
        );
        return fee;
    }

    let contributions = bracket_contributions(billing_date, asset_value, fee_schedules);
    let fee: Money = contributions.iter().map(|c| c.contribution).sum();
    debug!(
        product_type = product_type.id,
        %asset_value,
        %schedule_as_of,
        brackets = contributions.len(),
        %fee,
        "bracketed annual fee"
    );
    fee
}
