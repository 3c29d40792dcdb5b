//! Engagement-level invoice: assets, schedules, fee, adjustments and the
//! milestone-gated project fee for one engagement on one billing date.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::assets::{self, PlanAssetValue};
use crate::calendar::InvoicePeriod;
use crate::error::FeeEngineError;
use crate::fees;
use crate::milestones::{self, MilestoneStatus};
use crate::model::{ComponentTask, Engagement, FeeSchedule, Plan, PlanAsset, PlanEngagement, ProductType};
use crate::policy::FeePolicy;
use crate::schedules::select_applicable_schedules;
use crate::types::{with_metadata, ComputationOutput, Money, ProductTypeId};
use crate::FeeResult;

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

/// An engagement plus the reference data its invoice depends on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementInvoiceInput {
    pub billing_date: NaiveDate,
    pub engagement: Engagement,
    pub product_types: Vec<ProductType>,
    pub fee_schedules: Vec<FeeSchedule>,
    #[serde(default)]
    pub plan_engagements: Vec<PlanEngagement>,
    #[serde(default)]
    pub plans: Vec<Plan>,
    #[serde(default)]
    pub plan_assets: Vec<PlanAsset>,
    #[serde(default)]
    pub component_tasks: Vec<ComponentTask>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementInvoiceOutput {
    pub engagement_id: String,
    pub product_type_id: ProductTypeId,
    pub invoice_period: InvoicePeriod,
    pub due_date: Option<NaiveDate>,
    pub asset_value: Money,
    pub plan_assets: Vec<PlanAssetValue>,
    pub annual_fee: Money,
    /// Period fee before proration or credit.
    pub period_fee: Money,
    pub is_new: bool,
    pub is_terminated: bool,
    /// Fee actually billed for the period.
    pub billed_fee: Money,
    pub termination_credit: Money,
    pub milestone_status: MilestoneStatus,
    pub fixed_project_fee: Money,
    /// billed fee + fixed project fee - termination credit
    pub total_due: Money,
}

fn find_product_type(product_types: &[ProductType], id: ProductTypeId) -> FeeResult<&ProductType> {
    product_types
        .iter()
        .find(|p| p.id == id)
        .ok_or(FeeEngineError::UnknownProductType(id))
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Invoice one engagement as of `billing_date`.
pub fn invoice_engagement(
    input: &EngagementInvoiceInput,
    policy: &FeePolicy,
) -> FeeResult<ComputationOutput<EngagementInvoiceOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let engagement = &input.engagement;
    let billing_date = input.billing_date;

    // -- Validation ----------------------------------------------------------
    policy.validate()?;
    engagement.validate()?;
    let product = find_product_type(&input.product_types, engagement.product_type_id)?;

    if !engagement.is_within_date(billing_date) {
        warn!(engagement = %engagement.id, %billing_date, "engagement not active on billing date");
        warnings.push(format!(
            "Engagement '{}' is not active on {billing_date}",
            engagement.id
        ));
    }

    // -- Asset basis ---------------------------------------------------------
    let plan_assets = assets::plan_asset_values(
        engagement,
        billing_date,
        &input.plan_engagements,
        &input.plans,
        &input.plan_assets,
        policy,
    );
    let asset_value: Money = plan_assets.iter().map(|v| v.asset_value).sum();

    // -- Fees ----------------------------------------------------------------
    let schedules = select_applicable_schedules(&input.fee_schedules, product.id, engagement.effective_date);
    let annual_fee = fees::compute_annual_fee(
        product,
        billing_date,
        engagement.effective_date,
        asset_value,
        engagement.tier,
        &schedules,
    );
    if annual_fee.is_zero() {
        warnings.push("No fee schedule matched; annual fee is zero".into());
    }
    let period_fee = fees::compute_invoice_fee(annual_fee, product, billing_date, engagement.effective_date, policy);

    let is_new = engagement.is_new_on_billing_date(product, billing_date);
    let is_terminated = engagement.is_terminated_on_billing_date(product, billing_date);

    let (billed_fee, termination_credit) = match engagement.contract_termination_date {
        Some(terminated) if is_terminated => {
            if is_new {
                warnings.push("Engagement starts and terminates in the same quarter; proration skipped".into());
            }
            let credit = fees::compute_termination_credit(period_fee, terminated, product)?;
            (Decimal::ZERO, credit)
        }
        _ if is_new => (
            fees::prorate_for_new_engagement(product, period_fee, engagement.effective_date)?,
            Decimal::ZERO,
        ),
        _ => (period_fee, Decimal::ZERO),
    };

    // -- Project fee ---------------------------------------------------------
    let invoice_period = engagement.invoice_period(product, billing_date);
    let milestone_status =
        milestones::milestone_status(engagement, invoice_period, &input.component_tasks, policy);
    let fixed_project_fee =
        milestones::fixed_project_fee_for_period(engagement, product, billing_date, &input.component_tasks, policy);

    let total_due = billed_fee + fixed_project_fee - termination_credit;
    debug!(
        engagement = %engagement.id,
        %asset_value,
        %annual_fee,
        %billed_fee,
        %termination_credit,
        %fixed_project_fee,
        "engagement invoice"
    );

    let output = EngagementInvoiceOutput {
        engagement_id: engagement.id.clone(),
        product_type_id: product.id,
        invoice_period,
        due_date: engagement.due_date(billing_date, policy.default_days_to_pay),
        asset_value,
        plan_assets,
        annual_fee,
        period_fee,
        is_new,
        is_terminated,
        billed_fee,
        termination_credit,
        milestone_status,
        fixed_project_fee,
        total_due,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Engagement invoice: plan assets, resolved fee schedules, period split, proration/credit and milestone fee",
        &serde_json::json!({
            "billing_date": billing_date.to_string(),
            "fee_schedule_date": engagement.effective_date.to_string(),
            "asset_lookback_months": policy.asset_lookback_months,
            "default_days_to_pay": policy.default_days_to_pay,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BillingFrequency, BillingLength, BillingSchedule, TaskState};
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn base_input() -> EngagementInvoiceInput {
        EngagementInvoiceInput {
            billing_date: d(2016, 6, 30),
            engagement: Engagement {
                id: "eng-1".into(),
                client_id: "client-1".into(),
                name: "Acme 401(k)".into(),
                product_type_id: 3,
                tier: 0,
                effective_date: d(2015, 1, 1),
                expiration_date: None,
                contract_termination_date: None,
                end_date: None,
                days_to_pay: None,
                is_project_services: None,
                fixed_project_fee: dec!(0),
            },
            product_types: vec![ProductType {
                id: 3,
                name: "3(21) Fiduciary".into(),
                billing_frequency: BillingFrequency::Quarterly,
                billing_schedule: BillingSchedule::InAdvance,
                billing_length: BillingLength::Ongoing,
                is_tier_only: false,
            }],
            fee_schedules: vec![FeeSchedule {
                id: None,
                product_type_id: 3,
                tier_level: 0,
                asset_size_minimum: dec!(0),
                asset_size_maximum: dec!(0),
                annual_fee_fixed: dec!(0),
                annual_fee_percentage: dec!(0.0012),
                start_date: d(2010, 1, 1),
                end_date: d(2030, 12, 31),
            }],
            plan_engagements: vec![PlanEngagement {
                engagement_id: "eng-1".into(),
                plan_id: "p1".into(),
            }],
            plans: vec![Plan {
                id: "p1".into(),
                name: String::new(),
            }],
            plan_assets: vec![PlanAsset {
                plan_id: "p1".into(),
                asset_value: dec!(1_000_000),
                asset_value_as_of: d(2016, 6, 30),
            }],
            component_tasks: Vec::new(),
        }
    }

    #[test]
    fn test_ongoing_engagement_invoice() {
        let out = invoice_engagement(&base_input(), &FeePolicy::default()).unwrap();
        let r = &out.result;
        assert_eq!(r.asset_value, dec!(1_000_000));
        assert_eq!(r.annual_fee, dec!(1200));
        assert_eq!(r.billed_fee, dec!(300));
        assert_eq!(r.total_due, dec!(300));
        assert_eq!(r.due_date, Some(d(2016, 7, 30)));
        assert_eq!(r.invoice_period.start, d(2016, 4, 1));
        assert!(!r.is_new && !r.is_terminated);
    }

    #[test]
    fn test_new_engagement_is_prorated() {
        let mut input = base_input();
        input.engagement.effective_date = d(2016, 5, 16);
        let out = invoice_engagement(&input, &FeePolicy::default()).unwrap();
        // May 16 leaves 46 of 91 days in Q2
        assert!(out.result.is_new);
        assert_eq!(
            out.result.billed_fee.round_dp(2),
            (dec!(300) * dec!(46) / dec!(91)).round_dp(2)
        );
    }

    #[test]
    fn test_terminated_engagement_credits() {
        let mut input = base_input();
        input.engagement.contract_termination_date = Some(d(2016, 5, 16));
        let out = invoice_engagement(&input, &FeePolicy::default()).unwrap();
        let r = &out.result;
        assert!(r.is_terminated);
        assert_eq!(r.billed_fee, dec!(0));
        assert_eq!(r.termination_credit.round_dp(2), (dec!(300) * dec!(45) / dec!(91)).round_dp(2));
        assert_eq!(r.total_due, -r.termination_credit);
    }

    #[test]
    fn test_project_fee_added_when_milestones_done() {
        let mut input = base_input();
        input.engagement.is_project_services = Some(true);
        input.engagement.fixed_project_fee = dec!(5000);
        input.component_tasks = vec![ComponentTask {
            engagement_id: "eng-1".into(),
            task_code: "V2000".into(),
            state_code: TaskState::Completed,
            completed_on: Some(d(2016, 6, 1)),
        }];
        let out = invoice_engagement(&input, &FeePolicy::default()).unwrap();
        assert_eq!(out.result.milestone_status, MilestoneStatus::Recognized);
        assert_eq!(out.result.total_due, dec!(5300));
    }

    #[test]
    fn test_unknown_product_type() {
        let mut input = base_input();
        input.engagement.product_type_id = 42;
        assert!(matches!(
            invoice_engagement(&input, &FeePolicy::default()),
            Err(FeeEngineError::UnknownProductType(42))
        ));
    }

    #[test]
    fn test_inactive_engagement_warns() {
        let mut input = base_input();
        input.engagement.end_date = Some(d(2016, 3, 31));
        let out = invoice_engagement(&input, &FeePolicy::default()).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("not active")));
    }
}
