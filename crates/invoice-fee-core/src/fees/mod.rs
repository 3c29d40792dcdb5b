//! Fee arithmetic: annual fee, per-period invoice fee, proration and credit.

pub mod annual;
pub mod invoice;
pub mod proration;

pub use annual::{bracket_contributions, compute_annual_fee, tier_fee, BracketContribution};
pub use invoice::compute_invoice_fee;
pub use proration::{compute_termination_credit, prorate_for_new_engagement};
