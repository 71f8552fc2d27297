use chrono::NaiveDate;
use tracing::{info, warn};

use crate::error::TodoError;
use crate::gateway::TodoGateway;
use crate::nav::Route;
use crate::todo::{DueDateOrder, Status, StatusFilter, Todo, TodoId, TodoPatch};

/// Answer from the delete confirmation dialog. Only an explicit yes counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl Confirmation {
    pub fn from_answer(answer: Option<&str>) -> Self {
        match answer.map(str::trim) {
            Some("yes") => Confirmation::Confirmed,
            _ => Confirmation::Declined,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Cancelled,
    Deleted,
    AlreadyGone,
    Failed,
}

/// A list row with its derived presentation flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodoRow<'a> {
    pub todo: &'a Todo,
    pub overdue: bool,
}

/// View state of the todo list: the rows of the last successful fetch and
/// whether completed or open todos are shown.
#[derive(Debug, Default)]
pub struct ListController {
    todos: Vec<Todo>,
    show_completed: bool,
    error: Option<String>,
}

impl ListController {
    pub fn new(show_completed: bool) -> Self {
        Self {
            todos: Vec::new(),
            show_completed,
            error: None,
        }
    }

    pub fn show_completed(&self) -> bool {
        self.show_completed
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn filter(&self) -> StatusFilter {
        if self.show_completed {
            StatusFilter::completed()
        } else {
            StatusFilter::active()
        }
    }

    pub async fn mount(&mut self, gateway: &dyn TodoGateway) -> bool {
        self.refresh(gateway).await
    }

    /// Replaces the rows wholesale. On failure the previous rows stay and an
    /// error is recorded.
    pub async fn refresh(&mut self, gateway: &dyn TodoGateway) -> bool {
        let filter = self.filter();
        match gateway.fetch_todos(&filter, DueDateOrder::Ascending).await {
            Ok(todos) => {
                self.todos = todos;
                self.error = None;
                true
            }
            Err(err) => {
                warn!(error = %err, show_completed = self.show_completed, "failed to fetch todos");
                self.error = Some(format!("Failed to load tasks: {}", err));
                false
            }
        }
    }

    pub async fn set_show_completed(&mut self, gateway: &dyn TodoGateway, show_completed: bool) -> bool {
        if self.show_completed == show_completed {
            return self.error.is_none();
        }
        self.show_completed = show_completed;
        self.refresh(gateway).await
    }

    pub async fn toggle_completed(&mut self, gateway: &dyn TodoGateway) -> bool {
        let next = !self.show_completed;
        self.set_show_completed(gateway, next).await
    }

    /// Marks a todo completed, then refetches with the current filter.
    pub async fn mark_complete(&mut self, gateway: &dyn TodoGateway, id: TodoId) -> bool {
        match gateway.update_todo(id, &TodoPatch::status(Status::Completed)).await {
            Ok(()) => {
                info!(%id, "marked todo complete");
                self.refresh(gateway).await
            }
            Err(err) => {
                warn!(%id, error = %err, "failed to mark todo complete");
                self.error = Some(format!("Failed to complete the task: {}", err));
                false
            }
        }
    }

    /// Deletes a todo after a positive confirmation. The row is dropped
    /// locally without a refetch; a row that is already gone at the store
    /// counts as deleted.
    pub async fn delete(
        &mut self,
        gateway: &dyn TodoGateway,
        id: TodoId,
        confirmation: Confirmation,
    ) -> DeleteOutcome {
        if confirmation != Confirmation::Confirmed {
            return DeleteOutcome::Cancelled;
        }

        let outcome = match gateway.delete_todo(id).await {
            Ok(()) => DeleteOutcome::Deleted,
            Err(TodoError::NotFound(_)) => DeleteOutcome::AlreadyGone,
            Err(err) => {
                warn!(%id, error = %err, "failed to delete todo");
                self.error = Some(format!("Failed to delete the task: {}", err));
                return DeleteOutcome::Failed;
            }
        };

        info!(%id, ?outcome, "deleted todo");
        self.todos.retain(|t| t.id != id);
        outcome
    }

    pub fn edit(&self, id: TodoId) -> Route {
        Route::Edit(id)
    }

    /// Rows in gateway order with the overdue flag derived for `today`.
    pub fn rows(&self, today: NaiveDate) -> Vec<TodoRow<'_>> {
        self.todos
            .iter()
            .map(|todo| TodoRow {
                todo,
                overdue: todo.overdue(today),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{days_from_today, today, FakeGateway, Op};

    fn ids(list: &ListController) -> Vec<TodoId> {
        list.todos().iter().map(|t| t.id).collect()
    }

    #[tokio::test]
    async fn scenario_shows_open_rows_then_completed_rows() {
        let (gw, a, b, c) = FakeGateway::scenario();
        let mut list = ListController::new(false);

        assert!(list.mount(&gw).await);
        let rows = list.rows(today());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].todo.id, a.id);
        assert!(rows[0].overdue);
        assert_eq!(rows[1].todo.id, b.id);
        assert!(!rows[1].overdue);

        assert!(list.set_show_completed(&gw, true).await);
        assert_eq!(ids(&list), vec![c.id]);
        // Completed rows are never overdue.
        assert!(!list.rows(today())[0].overdue);
    }

    #[tokio::test]
    async fn toggling_back_restores_the_open_filter() {
        let (gw, _, _, _) = FakeGateway::scenario();
        let mut list = ListController::new(false);
        list.mount(&gw).await;

        list.toggle_completed(&gw).await;
        list.toggle_completed(&gw).await;

        assert!(!list.show_completed());
        assert_eq!(list.filter(), StatusFilter::active());
        let expected = gw
            .fetch_todos(&StatusFilter::active(), DueDateOrder::Ascending)
            .await
            .unwrap();
        assert_eq!(list.todos(), expected.as_slice());
    }

    #[tokio::test]
    async fn setting_the_same_flag_does_not_refetch() {
        let (gw, _, _, _) = FakeGateway::scenario();
        let mut list = ListController::new(false);
        list.mount(&gw).await;

        list.set_show_completed(&gw, false).await;

        assert_eq!(gw.count(Op::FetchMany), 1);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_rows_and_reports() {
        let (gw, a, b, _) = FakeGateway::scenario();
        let mut list = ListController::new(false);
        list.mount(&gw).await;

        gw.fail(Op::FetchMany, TodoError::DataAccess("connection reset".to_string()));
        assert!(!list.refresh(&gw).await);
        assert_eq!(ids(&list), vec![a.id, b.id]);
        assert!(list.error().unwrap().contains("connection reset"));

        gw.heal(Op::FetchMany);
        assert!(list.refresh(&gw).await);
        assert_eq!(list.error(), None);
    }

    #[tokio::test]
    async fn completing_an_open_todo_removes_it_after_refresh() {
        let (gw, a, b, _) = FakeGateway::scenario();
        let mut list = ListController::new(false);
        list.mount(&gw).await;

        assert!(list.mark_complete(&gw, a.id).await);

        assert_eq!(ids(&list), vec![b.id]);
        assert_eq!(gw.get(a.id).unwrap().status, Status::Completed);
        assert_eq!(gw.count(Op::FetchMany), 2);
    }

    #[tokio::test]
    async fn failed_completion_leaves_rows_untouched() {
        let (gw, a, b, _) = FakeGateway::scenario();
        let mut list = ListController::new(false);
        list.mount(&gw).await;

        gw.fail(Op::Update, TodoError::DataAccess("timeout".to_string()));
        assert!(!list.mark_complete(&gw, a.id).await);

        assert_eq!(ids(&list), vec![a.id, b.id]);
        assert_eq!(list.todos()[0].status, Status::NotStarted);
        assert!(list.error().is_some());
        assert_eq!(gw.count(Op::FetchMany), 1);
    }

    #[tokio::test]
    async fn declined_delete_never_reaches_the_gateway() {
        let (gw, a, _, _) = FakeGateway::scenario();
        let mut list = ListController::new(false);
        list.mount(&gw).await;

        let outcome = list.delete(&gw, a.id, Confirmation::from_answer(None)).await;
        assert_eq!(outcome, DeleteOutcome::Cancelled);
        let outcome = list.delete(&gw, a.id, Confirmation::from_answer(Some("no"))).await;
        assert_eq!(outcome, DeleteOutcome::Cancelled);

        assert_eq!(gw.count(Op::Delete), 0);
        assert!(ids(&list).contains(&a.id));
    }

    #[tokio::test]
    async fn delete_removes_the_row_once_and_repeats_are_harmless() {
        let (gw, a, b, _) = FakeGateway::scenario();
        let mut list = ListController::new(false);
        list.mount(&gw).await;

        let first = list.delete(&gw, a.id, Confirmation::Confirmed).await;
        assert_eq!(first, DeleteOutcome::Deleted);
        assert_eq!(ids(&list), vec![b.id]);

        let second = list.delete(&gw, a.id, Confirmation::Confirmed).await;
        assert_eq!(second, DeleteOutcome::AlreadyGone);
        assert_eq!(ids(&list), vec![b.id]);
        assert_eq!(list.error(), None);

        // Local patch only, no refetch.
        assert_eq!(gw.count(Op::FetchMany), 1);
    }

    #[tokio::test]
    async fn delete_of_a_row_removed_elsewhere_drops_it_locally() {
        let (gw, a, b, _) = FakeGateway::scenario();
        let mut list = ListController::new(false);
        list.mount(&gw).await;
        gw.remove(a.id);

        let outcome = list.delete(&gw, a.id, Confirmation::Confirmed).await;

        assert_eq!(outcome, DeleteOutcome::AlreadyGone);
        assert_eq!(ids(&list), vec![b.id]);
    }

    #[tokio::test]
    async fn failed_delete_keeps_the_row() {
        let (gw, a, b, _) = FakeGateway::scenario();
        let mut list = ListController::new(false);
        list.mount(&gw).await;

        gw.fail(Op::Delete, TodoError::DataAccess("offline".to_string()));
        let outcome = list.delete(&gw, a.id, Confirmation::Confirmed).await;

        assert_eq!(outcome, DeleteOutcome::Failed);
        assert_eq!(ids(&list), vec![a.id, b.id]);
        assert!(list.error().unwrap().contains("offline"));
    }

    #[tokio::test]
    async fn delete_after_failed_fetch_keeps_the_error() {
        let (gw, a, _, _) = FakeGateway::scenario();
        gw.fail(Op::FetchMany, TodoError::DataAccess("db down".to_string()));
        let mut list = ListController::new(false);
        assert!(!list.mount(&gw).await);

        let outcome = list.delete(&gw, a.id, Confirmation::Confirmed).await;

        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert!(list.error().unwrap().contains("db down"));
    }

    #[tokio::test]
    async fn rows_keep_gateway_order() {
        let gw = FakeGateway::new();
        let late = gw.seed("late", days_from_today(5), Status::NotStarted);
        let early = gw.seed("early", days_from_today(2), Status::InProgress);
        let mut list = ListController::new(false);
        list.mount(&gw).await;

        let rows: Vec<TodoId> = list.rows(today()).iter().map(|r| r.todo.id).collect();
        assert_eq!(rows, vec![early.id, late.id]);
        assert_eq!(list.edit(late.id), Route::Edit(late.id));
    }
}
