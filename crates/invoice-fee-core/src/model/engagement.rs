use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::{self, InvoicePeriod};
use crate::error::FeeEngineError;
use crate::model::ProductType;
use crate::policy::DEFAULT_DAYS_TO_PAY;
use crate::types::{Money, ProductTypeId};
use crate::FeeResult;

/// A client contract as materialized by the CRM layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Engagement {
    pub id: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub name: String,
    pub product_type_id: ProductTypeId,
    #[serde(default)]
    pub tier: i32,
    pub effective_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<NaiveDate>,
    /// Unset means the contract has not been terminated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_termination_date: Option<NaiveDate>,
    /// Unset means open ended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_to_pay: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_project_services: Option<bool>,
    #[serde(default)]
    pub fixed_project_fee: Money,
}

impl Engagement {
    pub fn validate(&self) -> FeeResult<()> {
        if self.id.trim().is_empty() {
            return Err(FeeEngineError::invalid("id", "Engagement id cannot be blank"));
        }
        if let Some(end) = self.end_date {
            if self.effective_date > end {
                return Err(FeeEngineError::invalid(
                    "end_date",
                    format!(
                        "Engagement '{}' ends ({end}) before it takes effect ({})",
                        self.id, self.effective_date
                    ),
                ));
            }
        }
        if self.fixed_project_fee.is_sign_negative() {
            return Err(FeeEngineError::invalid(
                "fixed_project_fee",
                "Cannot be negative",
            ));
        }
        Ok(())
    }

    /// Effective on or before `date` and not yet ended.
    pub fn is_within_date(&self, date: NaiveDate) -> bool {
        self.effective_date <= date && self.end_date.map_or(true, |end| date <= end)
    }

    pub fn days_to_pay(&self) -> u32 {
        self.days_to_pay_or(DEFAULT_DAYS_TO_PAY)
    }

    pub fn days_to_pay_or(&self, default: u32) -> u32 {
        self.days_to_pay.unwrap_or(default)
    }

    /// Invoice due date for a billing date, `None` if it overflows the calendar.
    pub fn due_date(&self, billing_date: NaiveDate, default_days_to_pay: u32) -> Option<NaiveDate> {
        billing_date.checked_add_days(Days::new(u64::from(self.days_to_pay_or(default_days_to_pay))))
    }

    pub fn invoice_period(&self, product_type: &ProductType, billing_date: NaiveDate) -> InvoicePeriod {
        calendar::invoice_period(product_type.billing_frequency, billing_date)
    }

    pub fn invoice_period_start(&self, product_type: &ProductType, billing_date: NaiveDate) -> NaiveDate {
        self.invoice_period(product_type, billing_date).start
    }

    pub fn invoice_period_end(&self, product_type: &ProductType, billing_date: NaiveDate) -> NaiveDate {
        self.invoice_period(product_type, billing_date).end
    }

    /// Starts in the billing date's quarter (Quarterly, In Advance, Ongoing only).
    pub fn is_new_on_billing_date(&self, product_type: &ProductType, billing_date: NaiveDate) -> bool {
        product_type.is_quarterly_in_advance_ongoing()
            && calendar::same_quarter(billing_date, self.effective_date)
    }

    /// Terminates in the billing date's quarter (Quarterly, In Advance, Ongoing only).
    pub fn is_terminated_on_billing_date(
        &self,
        product_type: &ProductType,
        billing_date: NaiveDate,
    ) -> bool {
        product_type.is_quarterly_in_advance_ongoing()
            && self
                .contract_termination_date
                .is_some_and(|terminated| calendar::same_quarter(billing_date, terminated))
    }

    pub fn is_project_services(&self) -> bool {
        self.is_project_services == Some(true)
    }
}
