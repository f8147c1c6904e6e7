//! Model types for chores and their sub-tasks.

use crate::error::Error;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Format used to store and parse due dates.
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Chore status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Not started yet.
    #[default]
    Pending,
    /// Someone is working on it.
    InProgress,
    /// Done.
    Completed,
}

impl Status {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    /// Parse a status from a string.
    ///
    /// Accepts `in progress` and `in-progress` as spellings of `in_progress`.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not one of the known statuses.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, InvalidStatus> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" | "in progress" | "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(InvalidStatus(s.to_string())),
        }
    }

    /// Get the stored string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid status string is provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStatus(pub String);

impl std::fmt::Display for InvalidStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid status: '{}' (must be one of: pending, in_progress, completed)", self.0)
    }
}

impl std::error::Error for InvalidStatus {}

impl From<InvalidStatus> for Error {
    fn from(err: InvalidStatus) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Direction for moving a sub-task one slot among its siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards index 0.
    Up,
    /// Towards the end of the list.
    Down,
}

impl Direction {
    /// Parse a direction from a string.
    ///
    /// # Errors
    ///
    /// Returns an error for anything other than `up` or `down`.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, InvalidDirection> {
        match s.trim().to_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            _ => Err(InvalidDirection(s.to_string())),
        }
    }

    /// Get the string representation of the direction.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid move direction is provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDirection(pub String);

impl std::fmt::Display for InvalidDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid direction: '{}' (must be up or down)", self.0)
    }
}

impl std::error::Error for InvalidDirection {}

impl From<InvalidDirection> for Error {
    fn from(err: InvalidDirection) -> Self {
        Self::Validation(err.to_string())
    }
}

/// A chore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned identifier.
    pub id: i64,
    /// What needs doing.
    pub description: String,
    /// Current status.
    pub status: Status,
    /// Free-form planning notes.
    pub notes: String,
    /// Optional deadline.
    pub due_date: Option<NaiveDate>,
    /// Materials to gather, in the order they were added.
    pub materials_needed: Vec<String>,
    /// Sub-tasks ordered by `order_index`. Loaded fresh on every read.
    pub sub_tasks: Vec<Subtask>,
}

impl Task {
    /// Whether the chore is done.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self.status, Status::Completed)
    }

    /// Descriptions of the sub-tasks, in order.
    #[must_use]
    pub fn subtask_descriptions(&self) -> Vec<String> {
        self.sub_tasks.iter().map(|st| st.description.clone()).collect()
    }

    /// Number of completed sub-tasks.
    #[must_use]
    pub fn completed_subtasks(&self) -> usize {
        self.sub_tasks.iter().filter(|st| st.completed).count()
    }
}

/// A single ordered step of a chore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    /// Store-assigned identifier, unique across all chores.
    pub id: i64,
    /// ID of the owning chore.
    pub task_id: i64,
    /// What this step involves.
    pub description: String,
    /// Whether the step is done.
    pub completed: bool,
    /// Zero-based position among the chore's sub-tasks.
    pub order_index: i64,
}

/// Parse a due date in `YYYY-MM-DD` form.
///
/// Blank input means "no due date".
///
/// # Errors
///
/// Returns a validation error if non-blank input is not a valid date.
pub fn parse_due_date(text: &str) -> Result<Option<NaiveDate>, Error> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, DUE_DATE_FORMAT)
        .map(Some)
        .map_err(|_| Error::validation(format!("invalid due date '{trimmed}' (expected YYYY-MM-DD)")))
}

/// Format a due date for storage.
#[must_use]
pub fn format_due_date(date: NaiveDate) -> String {
    date.format(DUE_DATE_FORMAT).to_string()
}

/// Split a stored materials blob into items, dropping blank lines.
#[must_use]
pub fn parse_materials(text: &str) -> Vec<String> {
    text.lines().map(str::trim).filter(|line| !line.is_empty()).map(str::to_string).collect()
}

/// Join materials into the stored blob. An empty list is stored as NULL.
///
/// An item spanning several lines is stored as one item per line, which is
/// how `parse_materials` will read it back.
#[must_use]
pub fn join_materials<S: AsRef<str>>(items: &[S]) -> Option<String> {
    let lines: Vec<&str> = items
        .iter()
        .flat_map(|item| item.as_ref().lines())
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
