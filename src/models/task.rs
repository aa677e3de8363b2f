use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::Appointment;

/// Durable record of a scheduling decision. Rows are append-only: status
/// moves forward but records are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub task_id: String,
    #[serde(flatten)]
    pub appointment: Appointment,
    pub status: TaskStatus,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Scheduled,
    Done,
    Error,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Scheduled => "scheduled",
            TaskStatus::Done => "done",
            TaskStatus::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "done" => TaskStatus::Done,
            "error" => TaskStatus::Error,
            _ => TaskStatus::Scheduled,
        }
    }
}
