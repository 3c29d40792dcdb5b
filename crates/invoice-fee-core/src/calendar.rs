//! Calendar-quarter and invoice-period arithmetic.
//!
//! Proration and termination credits both measure a date against the
//! calendar quarter that contains it; `QuarterWindow` is that shared
//! `(quarter start, next quarter start)` pair. `invoice_period` gives the
//! month, quarter or year window a billing date falls in.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::FeeEngineError;
use crate::model::BillingFrequency;
use crate::FeeResult;

/// Calendar quarter (1-4) of a date.
pub fn quarter_of(date: NaiveDate) -> u32 {
    date.month0() / 3 + 1
}

/// True when both dates fall in the same quarter of the same year.
pub fn same_quarter(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && quarter_of(a) == quarter_of(b)
}

/// Last day of the month `date` falls in.
fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    (28..=31)
        .rev()
        .find_map(|day| date.with_day(day))
        .unwrap_or(date)
}

// ---------------------------------------------------------------------------
// Quarter window
// ---------------------------------------------------------------------------

/// The calendar quarter containing a date, as a half-open day range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterWindow {
    pub start: NaiveDate,
    /// First day of the following quarter (Jan 1 of next year for Q4).
    pub next_start: NaiveDate,
}

impl QuarterWindow {
    pub fn containing(date: NaiveDate) -> FeeResult<Self> {
        let degenerate = || FeeEngineError::DegenerateQuarterWindow { date };

        let first_month = (quarter_of(date) - 1) * 3 + 1;
        let start = NaiveDate::from_ymd_opt(date.year(), first_month, 1).ok_or_else(degenerate)?;
        let next_start = if first_month == 10 {
            NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(date.year(), first_month + 3, 1)
        }
        .ok_or_else(degenerate)?;

        let window = QuarterWindow { start, next_start };
        if window.total_days() <= 0 || date < start || date >= next_start {
            return Err(degenerate());
        }
        Ok(window)
    }

    /// Last day of the quarter.
    pub fn end(&self) -> NaiveDate {
        self.next_start.pred_opt().unwrap_or(self.start)
    }

    pub fn total_days(&self) -> i64 {
        (self.next_start - self.start).num_days()
    }

    /// Whole days from `date` up to (not including) the next quarter start.
    pub fn days_until_next(&self, date: NaiveDate) -> i64 {
        (self.next_start - date).num_days()
    }
}

// ---------------------------------------------------------------------------
// Invoice periods
// ---------------------------------------------------------------------------

/// Inclusive first/last day of an invoicing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoicePeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl InvoicePeriod {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Month, quarter or year containing `date`, by billing frequency.
pub fn invoice_period(frequency: BillingFrequency, date: NaiveDate) -> InvoicePeriod {
    let year = date.year();
    match frequency {
        BillingFrequency::Monthly => InvoicePeriod {
            start: date.with_day(1).unwrap_or(date),
            end: last_day_of_month(date),
        },
        BillingFrequency::Quarterly => {
            let first_month = (quarter_of(date) - 1) * 3 + 1;
            let start = NaiveDate::from_ymd_opt(year, first_month, 1).unwrap_or(date);
            let last_month_first = NaiveDate::from_ymd_opt(year, first_month + 2, 1).unwrap_or(date);
            InvoicePeriod {
                start,
                end: last_day_of_month(last_month_first),
            }
        }
        BillingFrequency::Yearly => InvoicePeriod {
            start: NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(date),
            end: NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(date),
        },
    }
}
