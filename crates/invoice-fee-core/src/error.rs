use chrono::NaiveDate;
use thiserror::Error;

use crate::types::ProductTypeId;

#[derive(Debug, Error)]
pub enum FeeEngineError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Unknown product type: {0}")]
    UnknownProductType(ProductTypeId),

    #[error("Degenerate quarter window: {date} does not resolve to a calendar quarter with days remaining")]
    DegenerateQuarterWindow { date: NaiveDate },

    #[error("Self-check failed: {failed} case(s) did not match ({cases})")]
    SelfCheckFailed { failed: usize, cases: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl FeeEngineError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        FeeEngineError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for FeeEngineError {
    fn from(e: serde_json::Error) -> Self {
        FeeEngineError::SerializationError(e.to_string())
    }
}
