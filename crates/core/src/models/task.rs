//! Task model

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Format the backend uses for `dueDate` (ISO-8601 local date-time)
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Priority range the task forms offer
pub const MIN_PRIORITY: i32 = 1;
pub const MAX_PRIORITY: i32 = 4;

/// Display name of a priority level
pub fn priority_label(priority: i32) -> &'static str {
    match priority {
        1 => "Low",
        2 => "Medium",
        3 => "High",
        4 => "Critical",
        _ => "Unknown",
    }
}

/// Workflow status of a task
///
/// Statuses the client does not know are kept verbatim in `Other` so a
/// newer backend never breaks list rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    New,
    InProgress,
    Completed,
    OnHold,
    Canceled,
    Other(String),
}

impl TaskStatus {
    /// All statuses the backend defines, in display order
    pub const KNOWN: [TaskStatus; 5] = [
        TaskStatus::New,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::OnHold,
        TaskStatus::Canceled,
    ];

    /// Wire name (`IN_PROGRESS`, ...)
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::New => "NEW",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::OnHold => "ON_HOLD",
            TaskStatus::Canceled => "CANCELED",
            TaskStatus::Other(s) => s,
        }
    }

    /// Human label (`IN PROGRESS`)
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, TaskStatus::Other(_))
    }
}

impl From<String> for TaskStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "NEW" => TaskStatus::New,
            "IN_PROGRESS" => TaskStatus::InProgress,
            "COMPLETED" => TaskStatus::Completed,
            "ON_HOLD" => TaskStatus::OnHold,
            "CANCELED" => TaskStatus::Canceled,
            _ => TaskStatus::Other(s),
        }
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        match TaskStatus::from(normalized) {
            TaskStatus::Other(_) => Err(Error::Validation(format!(
                "unknown task status {:?}, expected one of {}",
                s,
                TaskStatus::KNOWN
                    .iter()
                    .map(TaskStatus::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
            status => Ok(status),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task as returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub task_status: TaskStatus,
    /// Not range-checked; the backend stores whatever it was sent
    pub priority: i32,
    /// Kept exactly as the backend sent it
    #[serde(default)]
    pub due_date: Option<String>,
    pub user_id: i64,
}

impl Task {
    /// Parsed due date, if present and well-formed
    pub fn due_date_local(&self) -> Option<NaiveDateTime> {
        self.due_date.as_deref().and_then(parse_due_date)
    }
}

/// Body of `POST /tasks` and `PUT /tasks/{id}`
///
/// Ownership is assigned by the backend from the bearer token, so there
/// is no user id here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: i32,
    pub due_date: Option<String>,
}

impl TaskRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: TaskStatus::New,
            priority: MIN_PRIORITY,
            due_date: None,
        }
    }

    /// Set the due date from a parsed value, formatted the way the backend expects
    pub fn set_due(&mut self, due: NaiveDateTime) {
        self.due_date = Some(due.format(DUE_DATE_FORMAT).to_string());
    }

    /// Form-level checks before a request is sent
    ///
    /// The backend remains authoritative; this only catches input the
    /// forms would have refused.
    pub fn validate(&self) -> Result<()> {
        self.check(None)
    }

    /// Like [`validate`](Self::validate), but fields left as they are on
    /// `current` are passed through unchecked
    pub fn validate_update(&self, current: &Task) -> Result<()> {
        self.check(Some(current))
    }

    fn check(&self, current: Option<&Task>) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation("title is required".to_string()));
        }

        let unchanged_status = current.is_some_and(|t| t.task_status == self.status);
        if !unchanged_status && !self.status.is_known() {
            return Err(Error::Validation(format!(
                "unknown task status: {}",
                self.status
            )));
        }

        let unchanged_priority = current.is_some_and(|t| t.priority == self.priority);
        if !unchanged_priority && !(MIN_PRIORITY..=MAX_PRIORITY).contains(&self.priority) {
            return Err(Error::Validation(format!(
                "priority must be between {} and {}, got {}",
                MIN_PRIORITY, MAX_PRIORITY, self.priority
            )));
        }

        let unchanged_due = current.is_some_and(|t| t.due_date == self.due_date);
        if let Some(due) = self.due_date.as_ref().filter(|_| !unchanged_due) {
            if parse_due_date(due).is_none() {
                return Err(Error::Validation(format!(
                    "due date must look like 2024-05-01T10:00:00, got {}",
                    due
                )));
            }
        }
        Ok(())
    }
}

/// Prefill an edit form from an existing task
impl From<&Task> for TaskRequest {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.task_status.clone(),
            priority: task.priority,
            due_date: task.due_date.clone(),
        }
    }
}

/// Parse a backend date-time, tolerating fractional seconds
pub fn parse_due_date(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DUE_DATE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .ok()
}
