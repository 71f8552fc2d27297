//! In-memory `TodoGateway` for controller tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};

use crate::error::{TodoError, TodoResult};
use crate::gateway::TodoGateway;
use crate::todo::{DueDateOrder, NewTodo, Priority, Status, StatusFilter, Todo, TodoId, TodoPatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    FetchMany,
    FetchOne,
    Insert,
    Update,
    Delete,
}

#[derive(Default)]
struct FakeState {
    rows: Vec<Todo>,
    next_id: i64,
    calls: Vec<Op>,
    failures: HashMap<Op, TodoError>,
}

#[derive(Default)]
pub struct FakeGateway {
    state: Mutex<FakeState>,
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
}

pub fn days_from_today(days: i64) -> NaiveDate {
    today() + Duration::days(days)
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, task: &str, due_date: NaiveDate, status: Status) -> Todo {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let todo = Todo {
            id: TodoId::new(state.next_id),
            task: task.to_string(),
            detail: None,
            due_date,
            priority: Priority::Medium,
            status,
        };
        state.rows.push(todo.clone());
        todo
    }

    /// Store from the list scenario: A due yesterday, B due tomorrow, C
    /// completed last week.
    pub fn scenario() -> (Self, Todo, Todo, Todo) {
        let gw = Self::new();
        let a = gw.seed("A", days_from_today(-1), Status::NotStarted);
        let b = gw.seed("B", days_from_today(1), Status::InProgress);
        let c = gw.seed("C", days_from_today(-7), Status::Completed);
        (gw, a, b, c)
    }

    pub fn fail(&self, op: Op, err: TodoError) {
        self.state.lock().unwrap().failures.insert(op, err);
    }

    pub fn heal(&self, op: Op) {
        self.state.lock().unwrap().failures.remove(&op);
    }

    pub fn calls(&self) -> Vec<Op> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls().into_iter().filter(|c| *c == op).count()
    }

    pub fn get(&self, id: TodoId) -> Option<Todo> {
        self.state.lock().unwrap().rows.iter().find(|t| t.id == id).cloned()
    }

    pub fn remove(&self, id: TodoId) {
        self.state.lock().unwrap().rows.retain(|t| t.id != id);
    }

    fn record(&self, op: Op) -> TodoResult<std::sync::MutexGuard<'_, FakeState>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(op);
        if let Some(err) = state.failures.get(&op).cloned() {
            return Err(err);
        }
        Ok(state)
    }
}

#[async_trait]
impl TodoGateway for FakeGateway {
    async fn fetch_todos(&self, filter: &StatusFilter, order: DueDateOrder) -> TodoResult<Vec<Todo>> {
        let state = self.record(Op::FetchMany)?;
        let mut rows: Vec<Todo> = state
            .rows
            .iter()
            .filter(|t| filter.contains(t.status))
            .cloned()
            .collect();
        rows.sort_by_key(|t| t.due_date);
        if order == DueDateOrder::Descending {
            rows.reverse();
        }
        Ok(rows)
    }

    async fn fetch_todo(&self, id: TodoId) -> TodoResult<Todo> {
        let state = self.record(Op::FetchOne)?;
        state
            .rows
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(TodoError::NotFound(id))
    }

    async fn insert_todo(&self, todo: &NewTodo) -> TodoResult<Todo> {
        let mut state = self.record(Op::Insert)?;
        let Some(priority) = todo.priority else {
            return Err(TodoError::Validation("rejected by store: priority".to_string()));
        };
        state.next_id += 1;
        let created = Todo {
            id: TodoId::new(state.next_id),
            task: todo.task.clone(),
            detail: todo.detail.clone(),
            due_date: todo.due_date,
            priority,
            status: todo.status,
        };
        state.rows.push(created.clone());
        Ok(created)
    }

    async fn update_todo(&self, id: TodoId, patch: &TodoPatch) -> TodoResult<()> {
        let mut state = self.record(Op::Update)?;
        let row = state
            .rows
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TodoError::NotFound(id))?;
        patch.apply_to(row);
        Ok(())
    }

    async fn delete_todo(&self, id: TodoId) -> TodoResult<()> {
        let mut state = self.record(Op::Delete)?;
        let before = state.rows.len();
        state.rows.retain(|t| t.id != id);
        if state.rows.len() == before {
            return Err(TodoError::NotFound(id));
        }
        Ok(())
    }
}
