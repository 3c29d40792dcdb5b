//! Partial-quarter adjustments for engagements that start or terminate
//! inside an invoiced quarter.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::calendar::QuarterWindow;
use crate::model::{BillingLength, ProductType};
use crate::types::{Money, Rate};
use crate::FeeResult;

/// Share of the quarter left from `date`, offset by `day_adjustment` days.
fn remaining_share(date: NaiveDate, day_adjustment: i64) -> FeeResult<Rate> {
    let window = QuarterWindow::containing(date)?;
    let total = window.total_days();
    let remaining = window.days_until_next(date) - day_adjustment;
    debug!(%date, total, remaining, "quarter share");
    Ok(Decimal::from(remaining) / Decimal::from(total))
}

/// Invoice fee scaled to the part of the start quarter the engagement covers.
///
/// Annual-length products are not prorated.
pub fn prorate_for_new_engagement(
    product_type: &ProductType,
    invoice_fee: Money,
    start_date: NaiveDate,
) -> FeeResult<Money> {
    if product_type.billing_length == BillingLength::Annual {
        return Ok(invoice_fee);
    }
    Ok(invoice_fee * remaining_share(start_date, 0)?)
}

/// Credit owed back for the unserved part of the termination quarter.
///
/// The termination day itself is billed, so one day is taken off the
/// remaining span. Annual-length products are credited the whole invoice fee.
pub fn compute_termination_credit(
    invoice_fee: Money,
    termination_date: NaiveDate,
    product_type: &ProductType,
) -> FeeResult<Money> {
    if product_type.billing_length == BillingLength::Annual {
        return Ok(invoice_fee);
    }
    Ok(invoice_fee * remaining_share(termination_date, 1)?)
}
