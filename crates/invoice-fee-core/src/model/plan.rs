use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::Money;

/// A retirement plan whose assets drive asset-based fees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Many-to-many link between engagements and plans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEngagement {
    pub engagement_id: String,
    pub plan_id: String,
}

/// A point-in-time valuation of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanAsset {
    pub plan_id: String,
    pub asset_value: Money,
    pub asset_value_as_of: NaiveDate,
}
