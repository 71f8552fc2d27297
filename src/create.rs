use chrono::NaiveDate;
use tracing::{info, warn};

use crate::fields::{FieldErrors, TodoFields};
use crate::gateway::TodoGateway;
use crate::nav::Route;
use crate::todo::Todo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatePhase {
    Ready,
    Submitting,
    Done,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(Todo, Route),
    Invalid,
    Failed,
}

#[derive(Debug)]
pub struct CreateController {
    today: NaiveDate,
    phase: CreatePhase,
    fields: TodoFields,
    field_errors: FieldErrors,
    error: Option<String>,
}

impl CreateController {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            phase: CreatePhase::Ready,
            fields: TodoFields::blank(today),
            field_errors: FieldErrors::default(),
            error: None,
        }
    }

    pub fn with_fields(today: NaiveDate, fields: TodoFields) -> Self {
        Self {
            fields,
            ..Self::new(today)
        }
    }

    pub fn phase(&self) -> CreatePhase {
        self.phase
    }

    pub fn fields(&self) -> &TodoFields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut TodoFields {
        &mut self.fields
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Inserts the entered todo. A rejected submission keeps every entered
    /// value so it can be resubmitted as is.
    pub async fn submit(&mut self, gateway: &dyn TodoGateway) -> CreateOutcome {
        let valid = match self.fields.validate() {
            Ok(valid) => valid,
            Err(errors) => {
                self.field_errors = errors;
                self.phase = CreatePhase::Ready;
                return CreateOutcome::Invalid;
            }
        };
        self.field_errors = FieldErrors::default();

        self.phase = CreatePhase::Submitting;
        match gateway.insert_todo(&valid.into_new_todo()).await {
            Ok(todo) => {
                info!(id = %todo.id, task = %todo.task, "created todo");
                self.fields = TodoFields::blank(self.today);
                self.error = None;
                self.phase = CreatePhase::Done;
                CreateOutcome::Created(todo, Route::List)
            }
            Err(err) => {
                warn!(error = %err, "failed to create todo");
                self.error = Some(format!("Failed to add the task: {}", err));
                self.phase = CreatePhase::Error;
                CreateOutcome::Failed
            }
        }
    }
}
