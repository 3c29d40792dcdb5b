pub mod assets;
pub mod calculator;
pub mod calendar;
pub mod error;
pub mod fees;
pub mod invoicing;
pub mod milestones;
pub mod model;
pub mod parse;
pub mod policy;
pub mod schedules;
pub mod self_check;
pub mod types;

pub use error::FeeEngineError;
pub use policy::FeePolicy;
pub use types::*;

/// Standard result type for all invoice fee operations
pub type FeeResult<T> = Result<T, FeeEngineError>;
