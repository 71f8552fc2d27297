use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{TodoError, TodoResult};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Store-assigned identifier of a todo row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(i64);

impl TodoId {
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TodoId {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(TodoId)
            .map_err(|_| TodoError::Validation(format!("invalid todo id '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl FromStr for Priority {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(TodoError::Validation(format!("unknown priority '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::NotStarted, Status::InProgress, Status::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::NotStarted => "not_started",
            Status::InProgress => "in_progress",
            Status::Completed => "completed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::NotStarted => "Not Started",
            Status::InProgress => "In Progress",
            Status::Completed => "Completed",
        }
    }
}

impl FromStr for Status {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(Status::NotStarted),
            "in_progress" => Ok(Status::InProgress),
            "completed" => Ok(Status::Completed),
            other => Err(TodoError::Validation(format!("unknown status '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub task: String,
    pub detail: Option<String>,
    pub due_date: NaiveDate,
    pub priority: Priority,
    pub status: Status,
}

impl Todo {
    /// Presentation flag for list rows; never written back.
    pub fn overdue(&self, today: NaiveDate) -> bool {
        is_overdue(self.due_date, today) && self.status != Status::Completed
    }
}

/// A due date is overdue once its calendar day has passed.
pub fn is_overdue(due_date: NaiveDate, today: NaiveDate) -> bool {
    due_date < today
}

// Insert payload. Priority may be unset here; the store refuses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub task: String,
    pub detail: Option<String>,
    pub due_date: NaiveDate,
    pub priority: Option<Priority>,
    pub status: Status,
}

/// Field-level update. Unset fields are left untouched at the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub task: Option<String>,
    pub detail: Option<Option<String>>,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
}

impl TodoPatch {
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.task.is_none()
            && self.detail.is_none()
            && self.due_date.is_none()
            && self.priority.is_none()
            && self.status.is_none()
    }

    pub fn apply_to(&self, todo: &mut Todo) {
        if let Some(task) = &self.task {
            todo.task = task.clone();
        }
        if let Some(detail) = &self.detail {
            todo.detail = detail.clone();
        }
        if let Some(due_date) = self.due_date {
            todo.due_date = due_date;
        }
        if let Some(priority) = self.priority {
            todo.priority = priority;
        }
        if let Some(status) = self.status {
            todo.status = status;
        }
    }
}

/// Non-empty set of statuses a fetch is restricted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFilter(BTreeSet<Status>);

impl StatusFilter {
    pub fn from_statuses<I>(statuses: I) -> TodoResult<Self>
    where
        I: IntoIterator<Item = Status>,
    {
        let set: BTreeSet<Status> = statuses.into_iter().collect();
        if set.is_empty() {
            return Err(TodoError::Validation(
                "status filter must name at least one status".to_string(),
            ));
        }
        Ok(Self(set))
    }

    pub fn active() -> Self {
        Self(BTreeSet::from([Status::NotStarted, Status::InProgress]))
    }

    pub fn completed() -> Self {
        Self(BTreeSet::from([Status::Completed]))
    }

    pub fn all() -> Self {
        Self(Status::ALL.into_iter().collect())
    }

    pub fn contains(&self, status: Status) -> bool {
        self.0.contains(&status)
    }

    pub fn iter(&self) -> impl Iterator<Item = Status> + '_ {
        self.0.iter().copied()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DueDateOrder {
    #[default]
    Ascending,
    Descending,
}

impl DueDateOrder {
    pub fn sql(self) -> &'static str {
        match self {
            DueDateOrder::Ascending => "ASC",
            DueDateOrder::Descending => "DESC",
        }
    }
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn todo(due_date: NaiveDate, status: Status) -> Todo {
        Todo {
            id: TodoId::new(1),
            task: "Water plants".to_string(),
            detail: None,
            due_date,
            priority: Priority::Medium,
            status,
        }
    }

    #[test]
    fn overdue_requires_past_due_date_and_open_status() {
        let today = date(2024, 5, 10);

        assert!(todo(date(2024, 5, 9), Status::NotStarted).overdue(today));
        assert!(todo(date(2024, 5, 1), Status::InProgress).overdue(today));
        assert!(!todo(date(2024, 5, 9), Status::Completed).overdue(today));
        assert!(!todo(date(2024, 5, 10), Status::NotStarted).overdue(today));
        assert!(!todo(date(2024, 5, 11), Status::InProgress).overdue(today));
    }

    #[test]
    fn enumerations_use_snake_case_names() {
        for status in Status::ALL {
            assert_eq!(status.as_str().parse::<Status>().unwrap(), status);
        }
        for priority in Priority::ALL {
            assert_eq!(priority.as_str().parse::<Priority>().unwrap(), priority);
        }
        assert!("done".parse::<Status>().is_err());
        assert!("".parse::<Priority>().is_err());
        assert_eq!(Status::default(), Status::NotStarted);
    }

    #[test]
    fn status_filter_rejects_empty_set() {
        assert!(StatusFilter::from_statuses([]).is_err());

        let active = StatusFilter::active();
        assert!(active.contains(Status::NotStarted));
        assert!(active.contains(Status::InProgress));
        assert!(!active.contains(Status::Completed));
        assert_eq!(StatusFilter::completed().iter().collect::<Vec<_>>(), vec![Status::Completed]);
    }

    #[test]
    fn patch_only_touches_set_fields() {
        let mut t = todo(date(2024, 5, 9), Status::NotStarted);
        TodoPatch::status(Status::Completed).apply_to(&mut t);

        assert_eq!(t.status, Status::Completed);
        assert_eq!(t.task, "Water plants");
        assert_eq!(t.priority, Priority::Medium);
        assert!(TodoPatch::default().is_empty());
    }

    #[test]
    fn todo_id_parses_from_path_segment() {
        assert_eq!("42".parse::<TodoId>().unwrap(), TodoId::new(42));
        assert!("abc".parse::<TodoId>().is_err());
    }
}
