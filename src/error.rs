use thiserror::Error;

use crate::todo::TodoId;

pub type TodoResult<T> = Result<T, TodoError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TodoError {
    #[error("data access failed: {0}")]
    DataAccess(String),

    #[error("todo not found: id={0}")]
    NotFound(TodoId),

    #[error("{0}")]
    Validation(String),
}

impl From<sqlx::Error> for TodoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => match db_err.kind() {
                sqlx::error::ErrorKind::NotNullViolation | sqlx::error::ErrorKind::CheckViolation => {
                    TodoError::Validation(format!("rejected by store: {}", db_err.message()))
                }
                // Some drivers only report the base constraint code.
                _ if db_err.message().contains("constraint failed") => {
                    TodoError::Validation(format!("rejected by store: {}", db_err.message()))
                }
                _ => TodoError::DataAccess(err.to_string()),
            },
            _ => TodoError::DataAccess(err.to_string()),
        }
    }
}
