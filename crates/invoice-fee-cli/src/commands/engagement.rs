use chrono::NaiveDate;
use clap::Args;
use serde_json::Value;
use tracing::info;

use invoice_fee_core::invoicing::{self, EngagementInvoiceInput};
use invoice_fee_core::self_check;
use invoice_fee_core::FeePolicy;

use super::date_arg;
use crate::input;

/// Arguments for a single engagement invoice
#[derive(Args)]
pub struct EngagementArgs {
    /// Path to JSON input file (engagement plus reference data)
    #[arg(long)]
    pub input: Option<String>,

    /// Billing date override
    #[arg(long, value_parser = date_arg)]
    pub billing_date: Option<NaiveDate>,
}

pub fn run_engagement(args: EngagementArgs, policy: &FeePolicy) -> Result<Value, Box<dyn std::error::Error>> {
    // Invoices are never produced from an engine that fails its known answers.
    self_check::require_self_check(policy)?;

    let mut invoice_input: EngagementInvoiceInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for engagement invoice".into());
    };
    if let Some(date) = args.billing_date {
        invoice_input.billing_date = date;
    }

    info!(engagement = %invoice_input.engagement.id, billing_date = %invoice_input.billing_date, "invoicing engagement");
    let result = invoicing::invoice_engagement(&invoice_input, policy)?;
    Ok(serde_json::to_value(result)?)
}
