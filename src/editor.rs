use tracing::{info, warn};

use crate::error::TodoError;
use crate::fields::{FieldErrors, TodoFields};
use crate::gateway::TodoGateway;
use crate::nav::Route;
use crate::todo::TodoId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorPhase {
    Loading,
    Ready,
    Submitting,
    Done,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorOutcome {
    Saved(Route),
    Invalid,
    Failed,
    /// Submit was refused because the record never loaded.
    NotReady,
}

/// Edit state for one existing todo.
#[derive(Debug)]
pub struct EditorController {
    id: TodoId,
    phase: EditorPhase,
    fields: TodoFields,
    field_errors: FieldErrors,
    error: Option<String>,
}

impl EditorController {
    pub fn new(id: TodoId) -> Self {
        Self {
            id,
            phase: EditorPhase::Loading,
            fields: TodoFields::default(),
            field_errors: FieldErrors::default(),
            error: None,
        }
    }

    pub fn id(&self) -> TodoId {
        self.id
    }

    pub fn phase(&self) -> EditorPhase {
        self.phase
    }

    pub fn fields(&self) -> &TodoFields {
        &self.fields
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn load(&mut self, gateway: &dyn TodoGateway) {
        self.phase = EditorPhase::Loading;
        match gateway.fetch_todo(self.id).await {
            Ok(todo) => {
                self.fields = TodoFields::from_todo(&todo);
                self.field_errors = FieldErrors::default();
                self.error = None;
                self.phase = EditorPhase::Ready;
            }
            Err(err) => {
                warn!(id = %self.id, error = %err, "failed to load todo for editing");
                self.error = Some(match err {
                    TodoError::NotFound(id) => format!("Task {} does not exist.", id),
                    other => format!("Failed to fetch the task: {}", other),
                });
                self.phase = EditorPhase::Error;
            }
        }
    }

    /// Local edits are only possible once the record has loaded.
    pub fn fields_mut(&mut self) -> Option<&mut TodoFields> {
        match self.phase {
            EditorPhase::Ready => Some(&mut self.fields),
            _ => None,
        }
    }

    pub fn set_fields(&mut self, fields: TodoFields) -> bool {
        match self.fields_mut() {
            Some(current) => {
                *current = fields;
                true
            }
            None => false,
        }
    }

    pub async fn submit(&mut self, gateway: &dyn TodoGateway) -> EditorOutcome {
        if self.phase != EditorPhase::Ready {
            return EditorOutcome::NotReady;
        }

        let valid = match self.fields.validate() {
            Ok(valid) => valid,
            Err(errors) => {
                self.field_errors = errors;
                return EditorOutcome::Invalid;
            }
        };
        self.field_errors = FieldErrors::default();

        self.phase = EditorPhase::Submitting;
        match gateway.update_todo(self.id, &valid.into_patch()).await {
            Ok(()) => {
                info!(id = %self.id, "updated todo");
                self.error = None;
                self.phase = EditorPhase::Done;
                EditorOutcome::Saved(Route::List)
            }
            Err(err) => {
                warn!(id = %self.id, error = %err, "failed to update todo");
                self.error = Some(format!("Failed to update the task: {}", err));
                self.phase = EditorPhase::Ready;
                EditorOutcome::Failed
            }
        }
    }
}
