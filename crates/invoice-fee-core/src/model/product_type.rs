use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::FeeEngineError;
use crate::types::ProductTypeId;

// ---------------------------------------------------------------------------
// Billing regime enums
// ---------------------------------------------------------------------------

/// How often an engagement is invoiced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BillingFrequency {
    Monthly,
    Quarterly,
    Yearly,
}

/// Whether a period is billed before or after it is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BillingSchedule {
    #[serde(rename = "In Advance", alias = "InAdvance")]
    InAdvance,
    #[serde(rename = "In Arrears", alias = "InArrears")]
    InArrears,
}

/// Whether the engagement renews indefinitely or runs for a single year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BillingLength {
    Ongoing,
    Annual,
}

impl FromStr for BillingFrequency {
    type Err = FeeEngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(BillingFrequency::Monthly),
            "quarterly" => Ok(BillingFrequency::Quarterly),
            "yearly" | "annually" => Ok(BillingFrequency::Yearly),
            other => Err(FeeEngineError::invalid(
                "billing_frequency",
                format!("'{other}' is not Monthly, Quarterly or Yearly"),
            )),
        }
    }
}

impl FromStr for BillingSchedule {
    type Err = FeeEngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "inadvance" => Ok(BillingSchedule::InAdvance),
            "inarrears" => Ok(BillingSchedule::InArrears),
            _ => Err(FeeEngineError::invalid(
                "billing_schedule",
                format!("'{}' is not In Advance or In Arrears", s.trim()),
            )),
        }
    }
}

impl FromStr for BillingLength {
    type Err = FeeEngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ongoing" => Ok(BillingLength::Ongoing),
            "annual" => Ok(BillingLength::Annual),
            other => Err(FeeEngineError::invalid(
                "billing_length",
                format!("'{other}' is not Ongoing or Annual"),
            )),
        }
    }
}

impl fmt::Display for BillingFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BillingFrequency::Monthly => "Monthly",
            BillingFrequency::Quarterly => "Quarterly",
            BillingFrequency::Yearly => "Yearly",
        };
        f.write_str(label)
    }
}

impl fmt::Display for BillingSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BillingSchedule::InAdvance => f.write_str("In Advance"),
            BillingSchedule::InArrears => f.write_str("In Arrears"),
        }
    }
}

impl fmt::Display for BillingLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BillingLength::Ongoing => f.write_str("Ongoing"),
            BillingLength::Annual => f.write_str("Annual"),
        }
    }
}

// ---------------------------------------------------------------------------
// Product type
// ---------------------------------------------------------------------------

/// Static billing classification for an engagement's product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductType {
    pub id: ProductTypeId,
    #[serde(default)]
    pub name: String,
    pub billing_frequency: BillingFrequency,
    pub billing_schedule: BillingSchedule,
    pub billing_length: BillingLength,
    /// Tier-fixed pricing instead of asset brackets. Accepts `0/1` or a bool.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_tier_only: bool,
}

impl ProductType {
    pub fn is_quarterly_in_advance(&self) -> bool {
        self.billing_frequency == BillingFrequency::Quarterly
            && self.billing_schedule == BillingSchedule::InAdvance
    }

    /// Only Quarterly, In Advance, Ongoing products get new/terminated handling
    /// on engagement-level queries.
    pub fn is_quarterly_in_advance_ongoing(&self) -> bool {
        self.is_quarterly_in_advance() && self.billing_length == BillingLength::Ongoing
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagRepr {
    Bool(bool),
    Int(i64),
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match FlagRepr::deserialize(deserializer)? {
        FlagRepr::Bool(b) => Ok(b),
        FlagRepr::Int(0) => Ok(false),
        FlagRepr::Int(1) => Ok(true),
        FlagRepr::Int(n) => Err(serde::de::Error::custom(format!(
            "is_tier_only must be 0 or 1, got {n}"
        ))),
    }
}
