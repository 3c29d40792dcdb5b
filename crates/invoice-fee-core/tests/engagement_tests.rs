use chrono::NaiveDate;
use invoice_fee_core::invoicing::{invoice_engagement, EngagementInvoiceInput};
use invoice_fee_core::milestones::MilestoneStatus;
use invoice_fee_core::self_check::require_self_check;
use invoice_fee_core::{FeeEngineError, FeePolicy};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// An engagement record as exported by the CRM layer, two plans, a stale
/// and a current valuation each, and a tier-priced project product.
const CRM_EXPORT: &str = r#"{
    "billing_date": "2016-09-30",
    "engagement": {
        "id": "7f1c",
        "client_id": "acme",
        "name": "Acme Retirement Plans",
        "product_type_id": 1,
        "effective_date": "2014-04-01",
        "days_to_pay": 90,
        "is_project_services": true,
        "fixed_project_fee": "2500"
    },
    "product_types": [
        {
            "id": 1,
            "name": "Investment Monitoring",
            "billing_frequency": "Quarterly",
            "billing_schedule": "In Arrears",
            "billing_length": "Ongoing",
            "is_tier_only": 0
        },
        {
            "id": 2,
            "name": "ERISA Review",
            "billing_frequency": "Yearly",
            "billing_schedule": "In Advance",
            "billing_length": "Annual",
            "is_tier_only": 1
        }
    ],
    "fee_schedules": [
        {
            "id": "im-low",
            "product_type_id": 1,
            "asset_size_minimum": "0",
            "asset_size_maximum": "5000000",
            "annual_fee_fixed": "1000",
            "annual_fee_percentage": "0.0010",
            "start_date": "2010-01-01",
            "end_date": "2020-12-31"
        },
        {
            "id": "im-high",
            "product_type_id": 1,
            "asset_size_minimum": "5000000",
            "asset_size_maximum": "0",
            "annual_fee_fixed": "0",
            "annual_fee_percentage": "0.0005",
            "start_date": "2010-01-01",
            "end_date": "2020-12-31"
        }
    ],
    "plan_engagements": [
        { "engagement_id": "7f1c", "plan_id": "401k" },
        { "engagement_id": "7f1c", "plan_id": "457b" }
    ],
    "plans": [
        { "id": "401k", "name": "Acme 401(k)" },
        { "id": "457b", "name": "Acme 457(b)" }
    ],
    "plan_assets": [
        { "plan_id": "401k", "asset_value": "4000000", "asset_value_as_of": "2016-06-30" },
        { "plan_id": "401k", "asset_value": "4200000", "asset_value_as_of": "2016-09-30" },
        { "plan_id": "457b", "asset_value": "1800000", "asset_value_as_of": "2016-08-31" },
        { "plan_id": "457b", "asset_value": "9999999", "asset_value_as_of": "2016-03-31" }
    ],
    "component_tasks": [
        { "engagement_id": "7f1c", "task_code": "RA2", "state_code": 1, "completed_on": "2016-08-12" },
        { "engagement_id": "7f1c", "task_code": "ZZ9", "state_code": 0 }
    ]
}"#;

fn crm_input() -> EngagementInvoiceInput {
    serde_json::from_str(CRM_EXPORT).unwrap()
}

#[test]
fn test_engagement_invoice_from_crm_export() {
    let out = invoice_engagement(&crm_input(), &FeePolicy::default()).unwrap();
    let r = &out.result;

    // 4.2M + 1.8M from the latest snapshots in the window
    assert_eq!(r.asset_value, dec!(6_000_000));
    assert_eq!(r.plan_assets.len(), 2);

    // full low bracket: 5M * 0.10% + 1,000 = 6,000
    // partial high:     1M * 0.05%        =   500
    assert_eq!(r.annual_fee, dec!(6500));
    assert_eq!(r.period_fee, dec!(1625));
    assert_eq!(r.billed_fee, dec!(1625));

    assert_eq!(r.milestone_status, MilestoneStatus::Recognized);
    assert_eq!(r.fixed_project_fee, dec!(2500));
    assert_eq!(r.total_due, dec!(4125));

    assert_eq!(r.invoice_period.start, d(2016, 7, 1));
    assert_eq!(r.invoice_period.end, d(2016, 9, 30));
    assert_eq!(r.due_date, Some(d(2016, 12, 29)));
    assert!(out.warnings.is_empty());
}

#[test]
fn test_excluded_product_ignores_plan_assets() {
    let mut input = crm_input();
    input.engagement.product_type_id = 2;
    input.engagement.tier = 1;
    let out = invoice_engagement(&input, &FeePolicy::default()).unwrap();
    assert_eq!(out.result.asset_value, dec!(0));
    // tier-only product with no tier schedules
    assert_eq!(out.result.annual_fee, dec!(0));
    assert!(out.warnings.iter().any(|w| w.contains("No fee schedule")));
}

#[test]
fn test_invalid_engagement_dates_rejected() {
    let mut input = crm_input();
    input.engagement.end_date = Some(d(2013, 1, 1));
    assert!(matches!(
        invoice_engagement(&input, &FeePolicy::default()),
        Err(FeeEngineError::InvalidInput { .. })
    ));
}

#[test]
fn test_self_check_gate_passes_for_house_policy() {
    let report = require_self_check(&FeePolicy::default()).unwrap();
    assert!(report.passed);
}
