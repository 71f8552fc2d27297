use chrono::NaiveDate;
use tracing::warn;

use crate::gateway::TodoGateway;
use crate::todo::{DueDateOrder, Priority, Status, StatusFilter, Todo};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoStats {
    pub total: usize,
    pub not_started: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub overdue: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl TodoStats {
    pub fn from_todos(todos: &[Todo], today: NaiveDate) -> Self {
        let mut stats = TodoStats {
            total: todos.len(),
            ..TodoStats::default()
        };
        for todo in todos {
            match todo.status {
                Status::NotStarted => stats.not_started += 1,
                Status::InProgress => stats.in_progress += 1,
                Status::Completed => stats.completed += 1,
            }
            match todo.priority {
                Priority::Low => stats.low += 1,
                Priority::Medium => stats.medium += 1,
                Priority::High => stats.high += 1,
            }
            if todo.overdue(today) {
                stats.overdue += 1;
            }
        }
        stats
    }

    pub fn count(&self, status: Status) -> usize {
        match status {
            Status::NotStarted => self.not_started,
            Status::InProgress => self.in_progress,
            Status::Completed => self.completed,
        }
    }

    pub fn count_priority(&self, priority: Priority) -> usize {
        match priority {
            Priority::Low => self.low,
            Priority::Medium => self.medium,
            Priority::High => self.high,
        }
    }

    /// Whole percent of todos completed, 0 when there are none.
    pub fn completion_percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed * 100) / self.total) as u32
    }
}

#[derive(Debug)]
pub struct StatsController {
    today: NaiveDate,
    stats: Option<TodoStats>,
    error: Option<String>,
}

impl StatsController {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            stats: None,
            error: None,
        }
    }

    pub fn stats(&self) -> Option<&TodoStats> {
        self.stats.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn mount(&mut self, gateway: &dyn TodoGateway) -> bool {
        match gateway.fetch_todos(&StatusFilter::all(), DueDateOrder::Ascending).await {
            Ok(todos) => {
                self.stats = Some(TodoStats::from_todos(&todos, self.today));
                self.error = None;
                true
            }
            Err(err) => {
                warn!(error = %err, "failed to load statistics");
                self.error = Some(format!("Failed to load statistics: {}", err));
                false
            }
        }
    }
}
