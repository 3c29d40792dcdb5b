use serde::{Deserialize, Serialize};

use crate::error::FeeEngineError;
use crate::types::ProductTypeId;
use crate::FeeResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// ERISA and vendor products carry no asset-based fee component.
pub const EXCLUDED_ASSET_PRODUCT_TYPES: [ProductTypeId; 6] = [2, 5, 8, 11, 13, 14];

/// Task codes whose completion earns a fixed project fee.
pub const MILESTONE_TASK_CODES: [&str; 4] = ["E6", "I10", "RA2", "V2000"];

/// Vendor search is always invoiced at half of its annual fee.
pub const VENDOR_SEARCH_PRODUCT_TYPE: ProductTypeId = 11;

pub const DEFAULT_DAYS_TO_PAY: u32 = 30;

const DEFAULT_ASSET_LOOKBACK_MONTHS: u32 = 3;
const DEFAULT_ASSET_LOOKAHEAD_DAYS: u32 = 1;

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Business-policy knobs consulted by the engine.
///
/// Every field defaults to the house policy, so a partial config file only
/// needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeePolicy {
    pub excluded_asset_product_types: Vec<ProductTypeId>,
    pub milestone_task_codes: Vec<String>,
    pub vendor_search_product_type: ProductTypeId,
    pub default_days_to_pay: u32,
    /// Oldest asset snapshot considered, in months before the billing date.
    pub asset_lookback_months: u32,
    /// Newest asset snapshot considered, in days after the billing date.
    pub asset_lookahead_days: u32,
}

impl Default for FeePolicy {
    fn default() -> Self {
        FeePolicy {
            excluded_asset_product_types: EXCLUDED_ASSET_PRODUCT_TYPES.to_vec(),
            milestone_task_codes: MILESTONE_TASK_CODES.iter().map(|c| c.to_string()).collect(),
            vendor_search_product_type: VENDOR_SEARCH_PRODUCT_TYPE,
            default_days_to_pay: DEFAULT_DAYS_TO_PAY,
            asset_lookback_months: DEFAULT_ASSET_LOOKBACK_MONTHS,
            asset_lookahead_days: DEFAULT_ASSET_LOOKAHEAD_DAYS,
        }
    }
}

impl FeePolicy {
    pub fn excludes_assets_for(&self, product_type_id: ProductTypeId) -> bool {
        self.excluded_asset_product_types.contains(&product_type_id)
    }

    pub fn is_milestone_task(&self, task_code: &str) -> bool {
        self.milestone_task_codes.iter().any(|c| c == task_code)
    }

    pub fn validate(&self) -> FeeResult<()> {
        if self.asset_lookback_months == 0 {
            return Err(FeeEngineError::invalid(
                "asset_lookback_months",
                "Must be at least one month",
            ));
        }
        if self.milestone_task_codes.iter().any(|c| c.trim().is_empty()) {
            return Err(FeeEngineError::invalid(
                "milestone_task_codes",
                "Task codes cannot be blank",
            ));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> FeeResult<Self> {
        let policy: FeePolicy = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }
}
