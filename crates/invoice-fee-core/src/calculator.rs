//! Operator calculation: annual fee and invoice fee for a product, with the
//! new-engagement and terminated-engagement adjustments.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::FeeEngineError;
use crate::fees::{self, BracketContribution};
use crate::model::{FeeSchedule, ProductType};
use crate::policy::FeePolicy;
use crate::schedules::select_applicable_schedules;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::FeeResult;

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMode {
    #[default]
    Standard,
    NewEngagement,
    Terminated,
}

/// Everything an operator supplies for one calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceCalculationInput {
    #[serde(default)]
    pub mode: CalculationMode,
    pub product_type: ProductType,
    pub billing_date: NaiveDate,
    /// Client fee-schedule date; schedules are resolved as of this date and
    /// it stands in for the engagement start in the quarterly annual split.
    pub fee_schedule_date: NaiveDate,
    #[serde(default)]
    pub asset_value: Money,
    /// Required for tier-only products.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier_level: Option<i32>,
    /// Required in `new_engagement` mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// Required in `terminated` mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination_date: Option<NaiveDate>,
    /// Raw catalog; filtered to the product and fee-schedule date here.
    pub fee_schedules: Vec<FeeSchedule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceCalculationOutput {
    /// Mode actually applied after regime checks.
    pub mode: CalculationMode,
    pub annual_fee: Money,
    /// Fee billed for the period (prorated in new mode, zero in terminated mode).
    pub invoice_fee: Money,
    /// Period fee before any proration or credit.
    pub period_fee: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit: Option<Money>,
    pub schedules_applied: usize,
    pub brackets: Vec<BracketContribution>,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Run one operator calculation.
pub fn calculate_invoice(
    input: &InvoiceCalculationInput,
    policy: &FeePolicy,
) -> FeeResult<ComputationOutput<InvoiceCalculationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let product = &input.product_type;

    // -- Validation ----------------------------------------------------------
    let tier_level = match (product.is_tier_only, input.tier_level) {
        (true, Some(level)) => level,
        (true, None) => {
            return Err(FeeEngineError::invalid(
                "tier_level",
                format!("Product type {} is priced by tier; a tier level is required", product.id),
            ))
        }
        (false, _) => 0,
    };
    if input.asset_value.is_sign_negative() {
        return Err(FeeEngineError::invalid("asset_value", "Cannot be negative"));
    }

    // -- Mode resolution -----------------------------------------------------
    let mode = if input.mode != CalculationMode::Standard && !product.is_quarterly_in_advance() {
        warnings.push(format!(
            "{:?} adjustments only apply to Quarterly, In Advance products; ran a standard calculation",
            input.mode
        ));
        CalculationMode::Standard
    } else {
        input.mode
    };

    // -- Annual fee ----------------------------------------------------------
    let schedules = select_applicable_schedules(&input.fee_schedules, product.id, input.fee_schedule_date);
    let annual_fee = fees::compute_annual_fee(
        product,
        input.billing_date,
        input.fee_schedule_date,
        input.asset_value,
        tier_level,
        &schedules,
    );
    let brackets = if product.is_tier_only {
        Vec::new()
    } else {
        fees::bracket_contributions(input.billing_date, input.asset_value, &schedules)
    };
    if annual_fee.is_zero() {
        warnings.push("No fee schedule matched; annual fee is zero".into());
    }

    // -- Invoice fee ---------------------------------------------------------
    let period_fee = fees::compute_invoice_fee(
        annual_fee,
        product,
        input.billing_date,
        input.fee_schedule_date,
        policy,
    );

    let (invoice_fee, credit) = match mode {
        CalculationMode::Standard => (period_fee, None),
        CalculationMode::NewEngagement => {
            let start_date = input.start_date.ok_or_else(|| {
                FeeEngineError::invalid("start_date", "Required for a new engagement calculation")
            })?;
            let prorated = fees::prorate_for_new_engagement(product, period_fee, start_date)?;
            (prorated, None)
        }
        CalculationMode::Terminated => {
            let termination_date = input.termination_date.ok_or_else(|| {
                FeeEngineError::invalid("termination_date", "Required for a terminated engagement calculation")
            })?;
            let credit = fees::compute_termination_credit(period_fee, termination_date, product)?;
            (Decimal::ZERO, Some(credit))
        }
    };
    debug!(?mode, %annual_fee, %period_fee, %invoice_fee, "invoice calculation");

    let output = InvoiceCalculationOutput {
        mode,
        annual_fee,
        invoice_fee,
        period_fee,
        credit,
        schedules_applied: schedules.len(),
        brackets,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Invoice fee from bracketed or tiered annual fee, split by billing frequency and length",
        &serde_json::json!({
            "product_type": product.id,
            "billing_frequency": product.billing_frequency.to_string(),
            "billing_schedule": product.billing_schedule.to_string(),
            "billing_length": product.billing_length.to_string(),
            "tier_only": product.is_tier_only,
            "fee_schedule_date": input.fee_schedule_date.to_string(),
            "billing_date": input.billing_date.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
