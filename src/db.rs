use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::{Sqlite, SqlitePool, SqlitePoolOptions};
use sqlx::{FromRow, QueryBuilder};
use tracing::debug;

use crate::error::{TodoError, TodoResult};
use crate::gateway::TodoGateway;
use crate::todo::{
    DueDateOrder, NewTodo, Priority, Status, StatusFilter, Todo, TodoId, TodoPatch, DATE_FORMAT,
};

pub type DbPool = SqlitePool;

const TODO_COLUMNS: &str = "id, task, detail, due_date, priority, status";

pub async fn init_db(database_url: &str, acquire_timeout: Duration) -> Result<DbPool> {
    let pool = SqlitePoolOptions::new()
        .acquire_timeout(acquire_timeout)
        .connect(database_url)
        .await
        .with_context(|| format!("failed to open database {}", database_url))?;
    create_tables(&pool).await?;
    Ok(pool)
}

async fn create_tables(pool: &DbPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS todo (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            task TEXT NOT NULL CHECK (length(trim(task)) > 0),
            detail TEXT,
            due_date TEXT NOT NULL,
            priority TEXT NOT NULL CHECK (priority IN ('low', 'medium', 'high')),
            status TEXT NOT NULL DEFAULT 'not_started'
                CHECK (status IN ('not_started', 'in_progress', 'completed'))
        )
        "#,
    )
    .execute(pool)
    .await
    .context("failed to create todo table")?;

    Ok(())
}

#[derive(Debug, FromRow)]
pub struct DbTodo {
    pub id: i64,
    pub task: String,
    pub detail: Option<String>,
    pub due_date: String,
    pub priority: String,
    pub status: String,
}

impl TryFrom<DbTodo> for Todo {
    type Error = TodoError;

    fn try_from(row: DbTodo) -> Result<Self, Self::Error> {
        let invalid = |field: &str, value: &str| {
            TodoError::DataAccess(format!(
                "invalid persisted todo id={}: {} '{}'",
                row.id, field, value
            ))
        };

        let due_date = NaiveDate::parse_from_str(&row.due_date, DATE_FORMAT)
            .map_err(|_| invalid("due_date", &row.due_date))?;
        let priority = row
            .priority
            .parse::<Priority>()
            .map_err(|_| invalid("priority", &row.priority))?;
        let status = row
            .status
            .parse::<Status>()
            .map_err(|_| invalid("status", &row.status))?;

        Ok(Todo {
            id: TodoId::new(row.id),
            task: row.task,
            detail: row.detail.filter(|d| !d.is_empty()),
            due_date,
            priority,
            status,
        })
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[derive(Clone)]
pub struct SqliteGateway {
    pool: DbPool,
}

impl SqliteGateway {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl TodoGateway for SqliteGateway {
    #[tracing::instrument(skip(self))]
    async fn fetch_todos(&self, filter: &StatusFilter, order: DueDateOrder) -> TodoResult<Vec<Todo>> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM todo WHERE status IN (", TODO_COLUMNS));
        let mut statuses = query.separated(", ");
        for status in filter.iter() {
            statuses.push_bind(status.as_str());
        }
        statuses.push_unseparated(")");
        query.push(" ORDER BY due_date ");
        query.push(order.sql());
        query.push(", id ASC");

        let rows: Vec<DbTodo> = query.build_query_as::<DbTodo>().fetch_all(&self.pool).await?;
        debug!(count = rows.len(), "fetched todos");

        rows.into_iter().map(Todo::try_from).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_todo(&self, id: TodoId) -> TodoResult<Todo> {
        let row: Option<DbTodo> =
            sqlx::query_as(&format!("SELECT {} FROM todo WHERE id = ?", TODO_COLUMNS))
                .bind(id.get())
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(row) => Todo::try_from(row),
            None => Err(TodoError::NotFound(id)),
        }
    }

    #[tracing::instrument(skip(self, todo), fields(task = %todo.task))]
    async fn insert_todo(&self, todo: &NewTodo) -> TodoResult<Todo> {
        let row: DbTodo = sqlx::query_as(&format!(
            "INSERT INTO todo (task, detail, due_date, priority, status) VALUES (?, ?, ?, ?, ?) RETURNING {}",
            TODO_COLUMNS
        ))
        .bind(&todo.task)
        .bind(todo.detail.as_deref())
        .bind(format_date(todo.due_date))
        .bind(todo.priority.map(|p| p.as_str()))
        .bind(todo.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        Todo::try_from(row)
    }

    #[tracing::instrument(skip(self, patch))]
    async fn update_todo(&self, id: TodoId, patch: &TodoPatch) -> TodoResult<()> {
        if patch.is_empty() {
            // Nothing to write; still report a missing row.
            return self.fetch_todo(id).await.map(|_| ());
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE todo SET ");
        let mut sets = query.separated(", ");
        if let Some(task) = &patch.task {
            sets.push("task = ");
            sets.push_bind_unseparated(task.as_str());
        }
        if let Some(detail) = &patch.detail {
            sets.push("detail = ");
            sets.push_bind_unseparated(detail.as_deref());
        }
        if let Some(due_date) = patch.due_date {
            sets.push("due_date = ");
            sets.push_bind_unseparated(format_date(due_date));
        }
        if let Some(priority) = patch.priority {
            sets.push("priority = ");
            sets.push_bind_unseparated(priority.as_str());
        }
        if let Some(status) = patch.status {
            sets.push("status = ");
            sets.push_bind_unseparated(status.as_str());
        }
        query.push(" WHERE id = ");
        query.push_bind(id.get());

        let result = query.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(TodoError::NotFound(id));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_todo(&self, id: TodoId) -> TodoResult<()> {
        let result = sqlx::query("DELETE FROM todo WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TodoError::NotFound(id));
        }
        Ok(())
    }
}

// One connection that never idles out, so the in-memory database survives
// for the whole test.
#[cfg(test)]
pub async fn open_in_memory() -> Result<DbPool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;
    create_tables(&pool).await?;
    Ok(pool)
}
