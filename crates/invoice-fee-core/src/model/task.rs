use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// CRM state code of a component task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum TaskState {
    Active,
    Completed,
    /// Any other CRM state (e.g. cancelled); ignored by the milestone gate.
    Other(i32),
}

impl From<i32> for TaskState {
    fn from(code: i32) -> Self {
        match code {
            0 => TaskState::Active,
            1 => TaskState::Completed,
            n => TaskState::Other(n),
        }
    }
}

impl From<TaskState> for i32 {
    fn from(state: TaskState) -> Self {
        match state {
            TaskState::Active => 0,
            TaskState::Completed => 1,
            TaskState::Other(n) => n,
        }
    }
}

/// A deliverable belonging to an engagement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentTask {
    pub engagement_id: String,
    pub task_code: String,
    pub state_code: TaskState,
    #[serde(default)]
    pub completed_on: Option<NaiveDate>,
}
