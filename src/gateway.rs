use async_trait::async_trait;

use crate::error::TodoResult;
use crate::todo::{DueDateOrder, NewTodo, StatusFilter, Todo, TodoId, TodoPatch};

/// Remote operations on the `todo` table.
///
/// Every method is a single independent round trip: no retries, no
/// transactions, no batching. Callers must not assume partial results on
/// failure.
#[async_trait]
pub trait TodoGateway: Send + Sync {
    /// Rows whose status is in `filter`, ordered by due date. Ties keep the
    /// store's natural order, which is not stable across calls.
    async fn fetch_todos(&self, filter: &StatusFilter, order: DueDateOrder) -> TodoResult<Vec<Todo>>;

    async fn fetch_todo(&self, id: TodoId) -> TodoResult<Todo>;

    async fn insert_todo(&self, todo: &NewTodo) -> TodoResult<Todo>;

    /// Only the fields set in `patch` change.
    async fn update_todo(&self, id: TodoId, patch: &TodoPatch) -> TodoResult<()>;

    /// Deleting a missing row fails with `NotFound`.
    async fn delete_todo(&self, id: TodoId) -> TodoResult<()>;
}
