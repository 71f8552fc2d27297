use chrono::NaiveDate;
use serde::Deserialize;

use crate::todo::{parse_date, NewTodo, Priority, Status, Todo, TodoPatch, DATE_FORMAT};

/// Editable field state as typed into a form. Values stay raw strings until
/// submit so a rejected submission never loses what the user entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TodoFields {
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub status: String,
}

/// Holds validation errors for the todo form
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    pub task: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
}

impl FieldErrors {
    pub fn has_errors(&self) -> bool {
        self.task.is_some() || self.due_date.is_some() || self.priority.is_some() || self.status.is_some()
    }

    pub fn messages(&self) -> Vec<&str> {
        [&self.task, &self.due_date, &self.priority, &self.status]
            .into_iter()
            .filter_map(|m| m.as_deref())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidFields {
    pub task: String,
    pub detail: Option<String>,
    pub due_date: NaiveDate,
    pub priority: Option<Priority>,
    pub status: Status,
}

impl TodoFields {
    pub fn blank(today: NaiveDate) -> Self {
        Self {
            task: String::new(),
            detail: String::new(),
            due_date: today.format(DATE_FORMAT).to_string(),
            priority: String::new(),
            status: Status::NotStarted.as_str().to_string(),
        }
    }

    pub fn from_todo(todo: &Todo) -> Self {
        Self {
            task: todo.task.clone(),
            detail: todo.detail.clone().unwrap_or_default(),
            due_date: todo.due_date.format(DATE_FORMAT).to_string(),
            priority: todo.priority.as_str().to_string(),
            status: todo.status.as_str().to_string(),
        }
    }

    /// Required: `task` and `due_date`. Enumerations are checked only when set;
    /// an unset status means the default.
    pub fn validate(&self) -> Result<ValidFields, FieldErrors> {
        let mut errors = FieldErrors::default();

        let task = self.task.trim();
        if task.is_empty() {
            errors.task = Some("Task is required".to_string());
        }

        let due_date = if self.due_date.trim().is_empty() {
            errors.due_date = Some("Due date is required".to_string());
            None
        } else {
            let parsed = parse_date(&self.due_date);
            if parsed.is_none() {
                errors.due_date = Some(format!("'{}' is not a valid date", self.due_date));
            }
            parsed
        };

        let priority = match self.priority.trim() {
            "" => None,
            raw => match raw.parse::<Priority>() {
                Ok(p) => Some(p),
                Err(_) => {
                    errors.priority = Some(format!("'{}' is not a valid priority", raw));
                    None
                }
            },
        };

        let status = match self.status.trim() {
            "" => Status::default(),
            raw => raw.parse::<Status>().unwrap_or_else(|_| {
                errors.status = Some(format!("'{}' is not a valid status", raw));
                Status::default()
            }),
        };

        match due_date {
            Some(due_date) if !errors.has_errors() => Ok(ValidFields {
                task: task.to_string(),
                detail: Some(self.detail.trim())
                    .filter(|d| !d.is_empty())
                    .map(str::to_string),
                due_date,
                priority,
                status,
            }),
            _ => Err(errors),
        }
    }
}

impl ValidFields {
    pub fn into_new_todo(self) -> NewTodo {
        NewTodo {
            task: self.task,
            detail: self.detail,
            due_date: self.due_date,
            priority: self.priority,
            status: self.status,
        }
    }

    /// Every editable field. An unset priority leaves the stored one alone.
    pub fn into_patch(self) -> TodoPatch {
        TodoPatch {
            task: Some(self.task),
            detail: Some(self.detail),
            due_date: Some(self.due_date),
            priority: self.priority,
            status: Some(self.status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    #[test]
    fn blank_fields_default_to_today_and_not_started() {
        let fields = TodoFields::blank(today());
        assert_eq!(fields.task, "");
        assert_eq!(fields.detail, "");
        assert_eq!(fields.due_date, "2024-05-10");
        assert_eq!(fields.priority, "");
        assert_eq!(fields.status, "not_started");
    }

    #[test]
    fn empty_task_and_due_date_are_rejected() {
        let mut fields = TodoFields::blank(today());
        fields.due_date.clear();

        let errors = fields.validate().unwrap_err();
        assert!(errors.task.is_some());
        assert!(errors.due_date.is_some());
        assert!(errors.priority.is_none());
        assert_eq!(errors.messages().len(), 2);
    }

    #[test]
    fn unknown_enumeration_values_are_rejected() {
        let fields = TodoFields {
            task: "Walk dog".to_string(),
            due_date: "2024-05-11".to_string(),
            priority: "urgent".to_string(),
            status: "done".to_string(),
            ..TodoFields::default()
        };

        let errors = fields.validate().unwrap_err();
        assert!(errors.priority.is_some());
        assert!(errors.status.is_some());
    }

    #[test]
    fn valid_fields_trim_and_map_into_patch() {
        let fields = TodoFields {
            task: "  Walk dog ".to_string(),
            detail: "   ".to_string(),
            due_date: "2024-05-11".to_string(),
            priority: "high".to_string(),
            status: "in_progress".to_string(),
        };

        let valid = fields.validate().unwrap();
        assert_eq!(valid.task, "Walk dog");
        assert_eq!(valid.detail, None);

        let patch = valid.into_patch();
        assert_eq!(patch.task.as_deref(), Some("Walk dog"));
        assert_eq!(patch.detail, Some(None));
        assert_eq!(patch.priority, Some(Priority::High));
        assert_eq!(patch.status, Some(Status::InProgress));
    }

    #[test]
    fn from_todo_round_trips_through_validation() {
        let todo = Todo {
            id: crate::todo::TodoId::new(3),
            task: "Pay rent".to_string(),
            detail: Some("landlord".to_string()),
            due_date: today(),
            priority: Priority::Low,
            status: Status::Completed,
        };

        let valid = TodoFields::from_todo(&todo).validate().unwrap();
        assert_eq!(valid.task, todo.task);
        assert_eq!(valid.detail, todo.detail);
        assert_eq!(valid.due_date, todo.due_date);
        assert_eq!(valid.priority, Some(todo.priority));
        assert_eq!(valid.status, todo.status);
    }
}
