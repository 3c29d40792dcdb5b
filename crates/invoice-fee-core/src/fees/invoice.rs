//! Splitting an annual fee into one invoice period's fee.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::calendar;
use crate::model::{BillingFrequency, BillingLength, ProductType};
use crate::policy::FeePolicy;
use crate::types::Money;

/// Added to Q2-start annual engagements invoiced after Q3 to settle a
/// historical one-cent discrepancy.
const Q2_LATE_INVOICE_ADJUSTMENT: Decimal = dec!(0.01);

/// Invoice fee for one billing period.
///
/// Dispatch order: vendor search product, Quarterly + Ongoing, Quarterly +
/// Annual (split by the start date's quarter), Monthly + Ongoing, then the
/// full annual fee for every other combination.
pub fn compute_invoice_fee(
    annual_fee: Money,
    product_type: &ProductType,
    invoice_date: NaiveDate,
    engagement_start_date: NaiveDate,
    policy: &FeePolicy,
) -> Money {
    if product_type.id == policy.vendor_search_product_type {
        debug!(product_type = product_type.id, "vendor search invoiced at half");
        return annual_fee / dec!(2);
    }

    match (product_type.billing_frequency, product_type.billing_length) {
        (BillingFrequency::Quarterly, BillingLength::Ongoing) => annual_fee / dec!(4),
        (BillingFrequency::Quarterly, BillingLength::Annual) => {
            quarterly_annual_fee(annual_fee, invoice_date, engagement_start_date)
        }
        (BillingFrequency::Monthly, BillingLength::Ongoing) => annual_fee / dec!(12),
        _ => annual_fee,
    }
}

/// An annual engagement billed quarterly collects its first-year fee over
/// the quarters that remain in the start year, then a quarter per invoice.
fn quarterly_annual_fee(annual_fee: Money, invoice_date: NaiveDate, start_date: NaiveDate) -> Money {
    if invoice_date.year() > start_date.year() {
        return annual_fee / dec!(4);
    }

    let start_quarter = calendar::quarter_of(start_date);
    debug!(start_quarter, %invoice_date, "quarterly annual split");
    match start_quarter {
        1 => annual_fee / dec!(3),
        2 => {
            let fee = annual_fee / dec!(2);
            if invoice_date > third_quarter_end(start_date) {
                fee + Q2_LATE_INVOICE_ADJUSTMENT
            } else {
                fee
            }
        }
        _ => annual_fee,
    }
}

/// Sep 30 of the date's year.
fn third_quarter_end(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 9, 30).unwrap_or(NaiveDate::MAX)
}
