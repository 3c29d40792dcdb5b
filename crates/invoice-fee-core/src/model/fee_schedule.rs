use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Money, ProductTypeId, Rate};

/// One pricing bracket (or tier) of a product's fee schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeSchedule {
    #[serde(default)]
    pub id: Option<String>,
    pub product_type_id: ProductTypeId,
    /// Only consulted for tier-only products.
    #[serde(default)]
    pub tier_level: i32,
    #[serde(default)]
    pub asset_size_minimum: Money,
    /// Zero means the bracket has no upper bound.
    #[serde(default)]
    pub asset_size_maximum: Money,
    #[serde(default)]
    pub annual_fee_fixed: Money,
    #[serde(default)]
    pub annual_fee_percentage: Rate,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl FeeSchedule {
    pub fn is_unbounded(&self) -> bool {
        self.asset_size_maximum == Decimal::ZERO
    }

    /// Valid on `date` when it falls inside `[start_date, end_date]`.
    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Has this schedule lapsed before the billing date?
    pub fn has_lapsed(&self, billing_date: NaiveDate) -> bool {
        self.end_date < billing_date
    }

    /// Identity of the bracket this schedule prices, ignoring its dates.
    pub(crate) fn bracket_key(&self) -> (i32, Money, Money) {
        (
            self.tier_level,
            self.asset_size_minimum.normalize(),
            self.asset_size_maximum.normalize(),
        )
    }
}
