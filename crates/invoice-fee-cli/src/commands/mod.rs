pub mod calculate;
pub mod engagement;
pub mod self_check;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use invoice_fee_core::parse;

// clap value parsers backed by the engine's validated parsing

pub fn date_arg(raw: &str) -> Result<NaiveDate, String> {
    parse::parse_date("date", raw).map_err(|e| e.to_string())
}

pub fn money_arg(raw: &str) -> Result<Decimal, String> {
    parse::parse_money("amount", raw).map_err(|e| e.to_string())
}

pub fn tier_arg(raw: &str) -> Result<i32, String> {
    parse::parse_tier_level("tier_level", raw).map_err(|e| e.to_string())
}
