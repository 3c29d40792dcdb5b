//! Typed records supplied by the CRM layer.

pub mod engagement;
pub mod fee_schedule;
pub mod plan;
pub mod product_type;
pub mod task;

pub use engagement::Engagement;
pub use fee_schedule::FeeSchedule;
pub use plan::{Plan, PlanAsset, PlanEngagement};
pub use product_type::{BillingFrequency, BillingLength, BillingSchedule, ProductType};
pub use task::{ComponentTask, TaskState};
