use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use invoice_fee_core::calculator::{self, CalculationMode, InvoiceCalculationInput};
use invoice_fee_core::FeePolicy;

use super::{date_arg, money_arg, tier_arg};
use crate::input;

/// Arguments shared by the standard, new-engagement and terminated calculations.
///
/// The JSON input carries the product type and fee-schedule catalog; the
/// flags override its scalar fields.
#[derive(Args)]
pub struct CalculateArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    /// Billing date (MM/DD/YYYY or YYYY-MM-DD)
    #[arg(long, value_parser = date_arg)]
    pub billing_date: Option<NaiveDate>,

    /// Client fee-schedule date
    #[arg(long, value_parser = date_arg)]
    pub fee_schedule_date: Option<NaiveDate>,

    /// Total plan assets, e.g. "$3,000,000"
    #[arg(long, value_parser = money_arg)]
    pub asset_value: Option<Decimal>,

    /// Tier level for tier-only products
    #[arg(long, value_parser = tier_arg)]
    pub tier_level: Option<i32>,
}

/// New engagement: additionally takes the engagement start date.
#[derive(Args)]
pub struct NewEngagementArgs {
    #[command(flatten)]
    pub common: CalculateArgs,

    /// Engagement start date
    #[arg(long, value_parser = date_arg)]
    pub start_date: Option<NaiveDate>,
}

/// Terminated engagement: additionally takes the termination date.
#[derive(Args)]
pub struct TerminatedArgs {
    #[command(flatten)]
    pub common: CalculateArgs,

    /// Contract termination date
    #[arg(long, value_parser = date_arg)]
    pub termination_date: Option<NaiveDate>,
}

fn load_input(args: &CalculateArgs) -> Result<InvoiceCalculationInput, Box<dyn std::error::Error>> {
    let mut calc_input: InvoiceCalculationInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required (product type and fee schedules)".into());
    };

    if let Some(date) = args.billing_date {
        calc_input.billing_date = date;
    }
    if let Some(date) = args.fee_schedule_date {
        calc_input.fee_schedule_date = date;
    }
    if let Some(value) = args.asset_value {
        calc_input.asset_value = value;
    }
    if args.tier_level.is_some() {
        calc_input.tier_level = args.tier_level;
    }
    Ok(calc_input)
}

fn run(calc_input: InvoiceCalculationInput, policy: &FeePolicy) -> Result<Value, Box<dyn std::error::Error>> {
    let result = calculator::calculate_invoice(&calc_input, policy)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_calculate(args: CalculateArgs, policy: &FeePolicy) -> Result<Value, Box<dyn std::error::Error>> {
    let mut calc_input = load_input(&args)?;
    calc_input.mode = CalculationMode::Standard;
    run(calc_input, policy)
}

pub fn run_new_engagement(args: NewEngagementArgs, policy: &FeePolicy) -> Result<Value, Box<dyn std::error::Error>> {
    let mut calc_input = load_input(&args.common)?;
    calc_input.mode = CalculationMode::NewEngagement;
    if args.start_date.is_some() {
        calc_input.start_date = args.start_date;
    }
    run(calc_input, policy)
}

pub fn run_terminated(args: TerminatedArgs, policy: &FeePolicy) -> Result<Value, Box<dyn std::error::Error>> {
    let mut calc_input = load_input(&args.common)?;
    calc_input.mode = CalculationMode::Terminated;
    if args.termination_date.is_some() {
        calc_input.termination_date = args.termination_date;
    }
    run(calc_input, policy)
}
