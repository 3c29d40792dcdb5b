//! Plan asset valuation used as the basis for asset-based fees.

use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{Engagement, Plan, PlanAsset, PlanEngagement};
use crate::policy::FeePolicy;
use crate::types::Money;

/// The snapshot chosen for one linked plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanAssetValue {
    pub plan_id: String,
    pub asset_value: Money,
    pub asset_value_as_of: NaiveDate,
}

/// Inclusive range of snapshot dates considered for a billing date.
pub fn snapshot_window(billing_date: NaiveDate, policy: &FeePolicy) -> (NaiveDate, NaiveDate) {
    let earliest = billing_date
        .checked_sub_months(Months::new(policy.asset_lookback_months))
        .unwrap_or(NaiveDate::MIN);
    let latest = billing_date
        .checked_add_days(Days::new(u64::from(policy.asset_lookahead_days)))
        .unwrap_or(NaiveDate::MAX);
    (earliest, latest)
}

/// Latest snapshot of `plan_id` inside the window; the first listed wins a tie.
fn latest_snapshot<'a>(
    plan_id: &str,
    plan_assets: &'a [PlanAsset],
    (earliest, latest): (NaiveDate, NaiveDate),
) -> Option<&'a PlanAsset> {
    plan_assets
        .iter()
        .filter(|a| a.plan_id == plan_id)
        .filter(|a| earliest <= a.asset_value_as_of && a.asset_value_as_of <= latest)
        .fold(None, |best: Option<&PlanAsset>, a| match best {
            Some(b) if b.asset_value_as_of >= a.asset_value_as_of => Some(b),
            _ => Some(a),
        })
}

/// Chosen snapshot per plan linked to the engagement.
///
/// Excluded product types (ERISA, vendor) have no asset component and yield
/// an empty list. Plans without a snapshot in the window are omitted.
pub fn plan_asset_values(
    engagement: &Engagement,
    billing_date: NaiveDate,
    plan_engagements: &[PlanEngagement],
    plans: &[Plan],
    plan_assets: &[PlanAsset],
    policy: &FeePolicy,
) -> Vec<PlanAssetValue> {
    if policy.excludes_assets_for(engagement.product_type_id) {
        debug!(
            engagement = %engagement.id,
            product_type = engagement.product_type_id,
            "product type carries no asset component"
        );
        return Vec::new();
    }

    let window = snapshot_window(billing_date, policy);
    plan_engagements
        .iter()
        .filter(|pe| pe.engagement_id == engagement.id)
        .filter_map(|pe| {
            let Some(plan) = plans.iter().find(|p| p.id == pe.plan_id) else {
                warn!(
                    engagement = %engagement.id,
                    plan = %pe.plan_id,
                    "plan link has no plan record"
                );
                return None;
            };
            latest_snapshot(&plan.id, plan_assets, window).map(|a| PlanAssetValue {
                plan_id: plan.id.clone(),
                asset_value: a.asset_value,
                asset_value_as_of: a.asset_value_as_of,
            })
        })
        .collect()
}

/// Total plan assets billable for an engagement on `billing_date`.
pub fn assets_for_invoice(
    engagement: &Engagement,
    billing_date: NaiveDate,
    plan_engagements: &[PlanEngagement],
    plans: &[Plan],
    plan_assets: &[PlanAsset],
    policy: &FeePolicy,
) -> Money {
    plan_asset_values(engagement, billing_date, plan_engagements, plans, plan_assets, policy)
        .iter()
        .fold(Decimal::ZERO, |acc, v| acc + v.asset_value)
}
