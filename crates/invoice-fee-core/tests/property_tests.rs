use chrono::{Days, NaiveDate};
use invoice_fee_core::calendar::invoice_period;
use invoice_fee_core::fees;
use invoice_fee_core::milestones::fixed_project_fee_for_period;
use invoice_fee_core::model::{
    BillingFrequency, BillingLength, BillingSchedule, ComponentTask, Engagement, FeeSchedule, Plan, PlanAsset,
    PlanEngagement, ProductType, TaskState,
};
use invoice_fee_core::{assets, FeePolicy};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0u64..73_000).prop_map(|offset| {
        NaiveDate::from_ymd_opt(1950, 1, 1)
            .unwrap()
            .checked_add_days(Days::new(offset))
            .unwrap()
    })
}

fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000_00i64).prop_map(|n| Decimal::new(n, 2))
}

fn frequency_strategy() -> impl Strategy<Value = BillingFrequency> {
    prop_oneof![
        Just(BillingFrequency::Monthly),
        Just(BillingFrequency::Quarterly),
        Just(BillingFrequency::Yearly),
    ]
}

/// Well-formed bracket: non-negative rate and fixed fee, cap above the floor or unbounded.
fn bracket_strategy() -> impl Strategy<Value = FeeSchedule> {
    (
        0i64..10_000_000,
        prop::option::of(1i64..10_000_000),
        0i64..50,
        0i64..5_000,
    )
        .prop_map(|(min, width, bp, fixed)| FeeSchedule {
            id: None,
            product_type_id: 1,
            tier_level: 0,
            asset_size_minimum: Decimal::from(min),
            asset_size_maximum: width.map_or(Decimal::ZERO, |w| Decimal::from(min + w)),
            annual_fee_fixed: Decimal::from(fixed),
            annual_fee_percentage: Decimal::new(bp, 4),
            start_date: NaiveDate::from_ymd_opt(1900, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2200, 12, 31).unwrap(),
        })
}

fn product(frequency: BillingFrequency, length: BillingLength, tier_only: bool) -> ProductType {
    ProductType {
        id: 3,
        name: String::new(),
        billing_frequency: frequency,
        billing_schedule: BillingSchedule::InAdvance,
        billing_length: length,
        is_tier_only: tier_only,
    }
}

fn engagement(product_type_id: i32) -> Engagement {
    Engagement {
        id: "eng".into(),
        client_id: String::new(),
        name: String::new(),
        product_type_id,
        tier: 0,
        effective_date: NaiveDate::from_ymd_opt(1950, 1, 1).unwrap(),
        expiration_date: None,
        contract_termination_date: None,
        end_date: None,
        days_to_pay: None,
        is_project_services: Some(true),
        fixed_project_fee: dec!(10_000),
    }
}

fn billing_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2016, 3, 31).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_tier_only_returns_matching_tier_fee(
        fees_by_tier in prop::collection::vec(0i64..100_000, 1..6),
        wanted in 0i32..8,
    ) {
        let schedules: Vec<FeeSchedule> = fees_by_tier
            .iter()
            .enumerate()
            .map(|(i, fee)| FeeSchedule {
                id: None,
                product_type_id: 1,
                tier_level: i as i32,
                asset_size_minimum: Decimal::ZERO,
                asset_size_maximum: Decimal::ZERO,
                annual_fee_fixed: Decimal::from(*fee),
                annual_fee_percentage: Decimal::ZERO,
                start_date: NaiveDate::from_ymd_opt(1900, 1, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2200, 1, 1).unwrap(),
            })
            .collect();
        let pt = product(BillingFrequency::Quarterly, BillingLength::Ongoing, true);
        let fee = fees::compute_annual_fee(&pt, billing_date(), billing_date(), dec!(1_000_000), wanted, &schedules);
        let expected = fees_by_tier.get(wanted as usize).map_or(Decimal::ZERO, |f| Decimal::from(*f));
        prop_assert_eq!(fee, expected);
    }

    #[test]
    fn prop_bracket_sum_is_order_independent(
        schedules in prop::collection::vec(bracket_strategy(), 0..6),
        asset_value in amount_strategy(),
    ) {
        let pt = product(BillingFrequency::Quarterly, BillingLength::Ongoing, false);
        let forward = fees::compute_annual_fee(&pt, billing_date(), billing_date(), asset_value, 0, &schedules);
        let mut reversed = schedules.clone();
        reversed.reverse();
        let backward = fees::compute_annual_fee(&pt, billing_date(), billing_date(), asset_value, 0, &reversed);
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn prop_bracket_fee_is_monotonic_in_assets(
        schedules in prop::collection::vec(bracket_strategy(), 0..6),
        a in amount_strategy(),
        b in amount_strategy(),
    ) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let pt = product(BillingFrequency::Quarterly, BillingLength::Ongoing, false);
        let fee_low = fees::compute_annual_fee(&pt, billing_date(), billing_date(), low, 0, &schedules);
        let fee_high = fees::compute_annual_fee(&pt, billing_date(), billing_date(), high, 0, &schedules);
        prop_assert!(fee_low <= fee_high, "fee({}) = {} > fee({}) = {}", low, fee_low, high, fee_high);
    }

    #[test]
    fn prop_ongoing_splits_ignore_dates(invoice in date_strategy(), start in date_strategy()) {
        let policy = FeePolicy::default();
        let quarterly = product(BillingFrequency::Quarterly, BillingLength::Ongoing, false);
        let monthly = product(BillingFrequency::Monthly, BillingLength::Ongoing, false);
        prop_assert_eq!(fees::compute_invoice_fee(dec!(1200), &quarterly, invoice, start, &policy), dec!(300));
        prop_assert_eq!(fees::compute_invoice_fee(dec!(1200), &monthly, invoice, start, &policy), dec!(100));
    }

    #[test]
    fn prop_proration_on_quarter_start_is_full(year in 1950i32..2150, quarter in 0u32..4, fee in amount_strategy()) {
        let start = NaiveDate::from_ymd_opt(year, quarter * 3 + 1, 1).unwrap();
        let pt = product(BillingFrequency::Quarterly, BillingLength::Ongoing, false);
        prop_assert_eq!(fees::prorate_for_new_engagement(&pt, fee, start).unwrap(), fee);
    }

    #[test]
    fn prop_credit_never_exceeds_invoice_fee(termination in date_strategy(), fee in amount_strategy()) {
        let pt = product(BillingFrequency::Quarterly, BillingLength::Ongoing, false);
        let credit = fees::compute_termination_credit(fee, termination, &pt).unwrap();
        prop_assert!(credit <= fee);
        prop_assert!(credit >= Decimal::ZERO);
    }

    #[test]
    fn prop_excluded_products_have_no_assets(
        index in 0usize..6,
        value in amount_strategy(),
        as_of_offset in 0u64..90,
    ) {
        let policy = FeePolicy::default();
        let product_type_id = policy.excluded_asset_product_types[index];
        let asset = PlanAsset {
            plan_id: "p".into(),
            asset_value: value,
            asset_value_as_of: billing_date().checked_sub_days(Days::new(as_of_offset)).unwrap(),
        };
        let link = PlanEngagement { engagement_id: "eng".into(), plan_id: "p".into() };
        let plan = Plan { id: "p".into(), name: String::new() };
        let total = assets::assets_for_invoice(
            &engagement(product_type_id),
            billing_date(),
            &[link],
            &[plan],
            &[asset],
            &policy,
        );
        prop_assert_eq!(total, Decimal::ZERO);
    }

    #[test]
    fn prop_open_milestone_blocks_fixed_fee(
        completed in prop::collection::vec(0usize..4, 0..4),
        open in 0usize..4,
    ) {
        let policy = FeePolicy::default();
        let mut tasks: Vec<ComponentTask> = completed
            .iter()
            .map(|i| ComponentTask {
                engagement_id: "eng".into(),
                task_code: policy.milestone_task_codes[*i].clone(),
                state_code: TaskState::Completed,
                completed_on: Some(billing_date()),
            })
            .collect();
        tasks.push(ComponentTask {
            engagement_id: "eng".into(),
            task_code: policy.milestone_task_codes[open].clone(),
            state_code: TaskState::Active,
            completed_on: None,
        });
        let pt = product(BillingFrequency::Quarterly, BillingLength::Ongoing, false);
        let fee = fixed_project_fee_for_period(&engagement(3), &pt, billing_date(), &tasks, &policy);
        prop_assert_eq!(fee, Decimal::ZERO);
    }

    #[test]
    fn prop_invoice_period_contains_date(date in date_strategy(), frequency in frequency_strategy()) {
        let period = invoice_period(frequency, date);
        prop_assert!(period.start <= date && date <= period.end);
    }
}
