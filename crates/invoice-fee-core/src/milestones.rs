//! Fixed project fee recognition gated on milestone task completion.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::InvoicePeriod;
use crate::model::{ComponentTask, Engagement, ProductType, TaskState};
use crate::policy::FeePolicy;
use crate::types::Money;

/// Why a fixed project fee was or was not recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MilestoneStatus {
    NotProjectServices,
    /// At least one milestone task is still open.
    OpenMilestone,
    /// A completed milestone has no completion date or one outside the period.
    CompletedOutsidePeriod,
    Recognized,
}

/// Milestone gate outcome for one engagement and invoice period.
pub fn milestone_status(
    engagement: &Engagement,
    period: InvoicePeriod,
    tasks: &[ComponentTask],
    policy: &FeePolicy,
) -> MilestoneStatus {
    if !engagement.is_project_services() {
        return MilestoneStatus::NotProjectServices;
    }

    let milestones: Vec<&ComponentTask> = tasks
        .iter()
        .filter(|t| t.engagement_id == engagement.id && policy.is_milestone_task(&t.task_code))
        .collect();

    if milestones.iter().any(|t| t.state_code == TaskState::Active) {
        return MilestoneStatus::OpenMilestone;
    }

    let all_in_period = milestones
        .iter()
        .filter(|t| t.state_code == TaskState::Completed)
        .all(|t| t.completed_on.is_some_and(|done| period.contains(done)));

    if all_in_period {
        MilestoneStatus::Recognized
    } else {
        MilestoneStatus::CompletedOutsidePeriod
    }
}

/// Fixed project fee earned in the invoice period containing `billing_date`.
pub fn fixed_project_fee_for_period(
    engagement: &Engagement,
    product_type: &ProductType,
    billing_date: NaiveDate,
    tasks: &[ComponentTask],
    policy: &FeePolicy,
) -> Money {
    let period = engagement.invoice_period(product_type, billing_date);
    let status = milestone_status(engagement, period, tasks, policy);
    debug!(engagement = %engagement.id, ?status, "milestone gate");
    match status {
        MilestoneStatus::Recognized => engagement.fixed_project_fee,
        _ => Decimal::ZERO,
    }
}
