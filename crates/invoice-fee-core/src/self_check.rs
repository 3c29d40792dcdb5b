//! Known-answer checks that must pass before invoices are produced.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::assets;
use crate::error::FeeEngineError;
use crate::fees;
use crate::model::{
    BillingFrequency, BillingLength, BillingSchedule, Engagement, FeeSchedule, Plan, PlanAsset,
    PlanEngagement, ProductType,
};
use crate::policy::FeePolicy;
use crate::types::Money;
use crate::FeeResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelfCheckCase {
    pub name: String,
    pub expected: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelfCheckReport {
    pub cases: Vec<SelfCheckCase>,
    pub passed: bool,
}

impl SelfCheckReport {
    pub fn failures(&self) -> impl Iterator<Item = &SelfCheckCase> {
        self.cases.iter().filter(|c| !c.passed)
    }
}

fn ymd(y: i32, m: u32, d: u32) -> FeeResult<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| FeeEngineError::invalid("self_check", format!("{y}-{m}-{d} is not a date")))
}

fn product(id: i32, frequency: BillingFrequency, length: BillingLength, tier_only: bool) -> ProductType {
    ProductType {
        id,
        name: String::new(),
        billing_frequency: frequency,
        billing_schedule: BillingSchedule::InAdvance,
        billing_length: length,
        is_tier_only: tier_only,
    }
}

fn schedule(min: Money, max: Money, pct: Money, fixed: Money, tier_level: i32) -> FeeResult<FeeSchedule> {
    Ok(FeeSchedule {
        id: None,
        product_type_id: 1,
        tier_level,
        asset_size_minimum: min,
        asset_size_maximum: max,
        annual_fee_fixed: fixed,
        annual_fee_percentage: pct,
        start_date: ymd(2000, 1, 1)?,
        end_date: ymd(2099, 12, 31)?,
    })
}

fn bracketed_annual_fee() -> FeeResult<Money> {
    let schedules = vec![
        schedule(dec!(0), dec!(1_000_000), dec!(0.002), dec!(500), 0)?,
        schedule(dec!(1_000_000), dec!(5_000_000), dec!(0.001), dec!(250), 0)?,
        schedule(dec!(5_000_000), dec!(0), dec!(0.0005), dec!(100), 0)?,
    ];
    let pt = product(1, BillingFrequency::Quarterly, BillingLength::Ongoing, false);
    Ok(fees::compute_annual_fee(&pt, ymd(2016, 3, 31)?, ymd(2016, 1, 1)?, dec!(3_000_000), 0, &schedules))
}

fn tier_annual_fee() -> FeeResult<Money> {
    let schedules = vec![
        schedule(dec!(0), dec!(0), dec!(0), dec!(2500), 1)?,
        schedule(dec!(0), dec!(0), dec!(0), dec!(5000), 2)?,
    ];
    let pt = product(1, BillingFrequency::Quarterly, BillingLength::Ongoing, true);
    Ok(fees::compute_annual_fee(&pt, ymd(2016, 3, 31)?, ymd(2016, 1, 1)?, Decimal::ZERO, 2, &schedules))
}

fn excluded_product_assets(policy: &FeePolicy) -> FeeResult<Money> {
    let engagement = Engagement {
        id: "self-check".into(),
        client_id: String::new(),
        name: String::new(),
        product_type_id: policy.vendor_search_product_type,
        tier: 0,
        effective_date: ymd(2016, 1, 1)?,
        expiration_date: None,
        contract_termination_date: None,
        end_date: None,
        days_to_pay: None,
        is_project_services: None,
        fixed_project_fee: Decimal::ZERO,
    };
    let link = PlanEngagement {
        engagement_id: engagement.id.clone(),
        plan_id: "plan".into(),
    };
    let plan = Plan {
        id: "plan".into(),
        name: String::new(),
    };
    let asset = PlanAsset {
        plan_id: "plan".into(),
        asset_value: dec!(1_000_000),
        asset_value_as_of: ymd(2016, 3, 31)?,
    };
    Ok(assets::assets_for_invoice(&engagement, ymd(2016, 3, 31)?, &[link], &[plan], &[asset], policy))
}

fn run_cases(policy: &FeePolicy) -> Vec<(&'static str, Money, FeeResult<Money>)> {
    let quarterly_ongoing = product(3, BillingFrequency::Quarterly, BillingLength::Ongoing, false);
    let monthly_ongoing = product(4, BillingFrequency::Monthly, BillingLength::Ongoing, false);
    let quarterly_annual = product(9, BillingFrequency::Quarterly, BillingLength::Annual, false);
    let vendor_search = product(
        policy.vendor_search_product_type,
        BillingFrequency::Quarterly,
        BillingLength::Annual,
        false,
    );

    vec![
        (
            "quarterly ongoing invoice is a quarter of annual",
            dec!(300),
            ymd(2016, 3, 31).map(|b| fees::compute_invoice_fee(dec!(1200), &quarterly_ongoing, b, b, policy)),
        ),
        (
            "monthly ongoing invoice is a twelfth of annual",
            dec!(100),
            ymd(2016, 3, 31).map(|b| fees::compute_invoice_fee(dec!(1200), &monthly_ongoing, b, b, policy)),
        ),
        (
            "quarterly annual starting in Q1 bills a third",
            dec!(300),
            ymd(2016, 3, 31).and_then(|b| {
                Ok(fees::compute_invoice_fee(dec!(900), &quarterly_annual, b, ymd(2016, 2, 10)?, policy))
            }),
        ),
        (
            "quarterly annual starting in Q2 invoiced after Q3 adds a cent",
            dec!(450.01),
            ymd(2016, 10, 15).and_then(|b| {
                Ok(fees::compute_invoice_fee(dec!(900), &quarterly_annual, b, ymd(2016, 5, 1)?, policy))
            }),
        ),
        (
            "vendor search invoices half of annual",
            dec!(2500),
            ymd(2016, 6, 30).map(|b| fees::compute_invoice_fee(dec!(5000), &vendor_search, b, b, policy)),
        ),
        ("tier-only annual fee is the tier's fixed fee", dec!(5000), tier_annual_fee()),
        ("bracketed annual fee accumulates brackets", dec!(4750), bracketed_annual_fee()),
        (
            "new engagement on a quarter start is not reduced",
            dec!(300),
            ymd(2016, 7, 1).and_then(|s| fees::prorate_for_new_engagement(&quarterly_ongoing, dec!(300), s)),
        ),
        (
            "termination credit excludes the termination day",
            dec!(460),
            ymd(2016, 11, 15).and_then(|t| fees::compute_termination_credit(dec!(920), t, &quarterly_ongoing)),
        ),
        ("excluded product types carry no assets", Decimal::ZERO, excluded_product_assets(policy)),
    ]
}

/// Evaluate every known-answer case against the engine.
pub fn run_self_check(policy: &FeePolicy) -> SelfCheckReport {
    let cases: Vec<SelfCheckCase> = run_cases(policy)
        .into_iter()
        .map(|(name, expected, actual)| match actual {
            Ok(value) => SelfCheckCase {
                name: name.to_string(),
                expected,
                actual: Some(value),
                error: None,
                passed: value == expected,
            },
            Err(e) => SelfCheckCase {
                name: name.to_string(),
                expected,
                actual: None,
                error: Some(e.to_string()),
                passed: false,
            },
        })
        .collect();

    let passed = cases.iter().all(|c| c.passed);
    for case in cases.iter().filter(|c| !c.passed) {
        warn!(case = %case.name, expected = %case.expected, actual = ?case.actual, "self-check case failed");
    }
    info!(cases = cases.len(), passed, "self-check complete");
    SelfCheckReport { cases, passed }
}

/// Run the self-check and fail unless every case passes.
pub fn require_self_check(policy: &FeePolicy) -> FeeResult<SelfCheckReport> {
    let report = run_self_check(policy);
    if report.passed {
        return Ok(report);
    }
    let failed: Vec<&str> = report.failures().map(|c| c.name.as_str()).collect();
    Err(FeeEngineError::SelfCheckFailed {
        failed: failed.len(),
        cases: failed.join("; "),
    })
}
