//! Validated parsing of operator-supplied values.
//!
//! Each parser returns `InvalidInput` naming the offending field instead of
//! retrying; re-prompting is left to whatever drives the engine.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::FeeEngineError;
use crate::types::Money;
use crate::FeeResult;

const DATE_FORMATS: [&str; 3] = ["%m/%d/%Y", "%Y-%m-%d", "%m-%d-%Y"];

/// `MM/DD/YYYY`, `YYYY-MM-DD` or `MM-DD-YYYY`.
pub fn parse_date(field: &str, raw: &str) -> FeeResult<NaiveDate> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| FeeEngineError::invalid(field, format!("'{trimmed}' is not a date")))
}

/// A monetary amount; `$` signs and thousands separators are ignored.
pub fn parse_money(field: &str, raw: &str) -> FeeResult<Money> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();
    Decimal::from_str(&cleaned)
        .map_err(|_| FeeEngineError::invalid(field, format!("'{}' is not an amount", raw.trim())))
}

pub fn parse_tier_level(field: &str, raw: &str) -> FeeResult<i32> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| FeeEngineError::invalid(field, format!("'{}' is not a whole number", raw.trim())))
}

pub fn parse_flag(field: &str, raw: &str) -> FeeResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" => Ok(false),
        other => Err(FeeEngineError::invalid(field, format!("'{other}' is not true or false"))),
    }
}
