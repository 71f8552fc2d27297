use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, get_service, post},
    Form, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tower_http::services::ServeDir;
use tracing::debug;

use crate::config::{AppConfig, Theme};
use crate::create::{CreateController, CreateOutcome};
use crate::editor::{EditorController, EditorOutcome};
use crate::fields::TodoFields;
use crate::gateway::TodoGateway;
use crate::list::{Confirmation, ListController};
use crate::nav::Route;
use crate::stats::StatsController;
use crate::todo::TodoId;
use crate::views;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn TodoGateway>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(gateway: Arc<dyn TodoGateway>, config: AppConfig) -> Self {
        Self {
            gateway,
            config: Arc::new(config),
        }
    }

    fn gateway(&self) -> &dyn TodoGateway {
        self.gateway.as_ref()
    }

    fn today(&self) -> NaiveDate {
        self.config.today()
    }

    fn theme(&self) -> Theme {
        self.config.theme
    }
}

pub fn router(state: AppState) -> Router {
    let static_dir = ServeDir::new("static");

    Router::new()
        .route(&Route::List.path(), get(list_page))
        .route("/todos", get(list_fragment))
        .route("/todos/{id}/complete", post(complete_todo))
        .route("/todos/{id}/delete", get(confirm_delete).post(delete_todo))
        .route(&Route::Create.path(), get(new_todo_page).post(create_todo))
        .route("/edit/{id}", get(edit_todo_page).post(update_todo))
        .route(&Route::Stats.path(), get(stats_page))
        .with_state(state)
        .nest_service("/static", get_service(static_dir))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteForm {
    pub confirm: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

fn parse_id(raw: &str) -> Option<TodoId> {
    raw.trim().parse().ok()
}

fn not_found_page(state: &AppState, raw_id: &str) -> Response {
    let message = format!("Task '{}' not found", raw_id);
    (StatusCode::NOT_FOUND, Html(views::render_not_found(state.theme(), &message))).into_response()
}

fn not_found_fragment(raw_id: &str) -> Response {
    let message = format!("Task '{}' not found", raw_id);
    (StatusCode::NOT_FOUND, Html(views::render_error_fragment(&message))).into_response()
}

// GET / - Todo list page
async fn list_page(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Html<String> {
    let mut list = ListController::new(query.completed);
    list.mount(state.gateway()).await;
    Html(views::render_list_page(state.theme(), &list, state.today()))
}

// GET /todos - Just the list (for HTMX)
async fn list_fragment(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Html<String> {
    let mut list = ListController::new(query.completed);
    list.mount(state.gateway()).await;
    Html(views::render_list_fragment(&list, state.today()))
}

// POST /todos/:id/complete - Mark a todo completed and re-render the list
async fn complete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Response {
    let Some(todo_id) = parse_id(&id) else {
        return not_found_fragment(&id);
    };

    let mut list = ListController::new(query.completed);
    list.mount(state.gateway()).await;
    list.mark_complete(state.gateway(), todo_id).await;
    Html(views::render_list_fragment(&list, state.today())).into_response()
}

// GET /todos/:id/delete - Confirmation dialog
async fn confirm_delete(Path(id): Path<String>, Query(query): Query<ListQuery>) -> Response {
    let Some(todo_id) = parse_id(&id) else {
        return not_found_fragment(&id);
    };
    Html(views::render_delete_dialog(todo_id, query.completed)).into_response()
}

// POST /todos/:id/delete - Delete after confirmation
async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<DeleteForm>,
) -> Response {
    let Some(todo_id) = parse_id(&id) else {
        return not_found_fragment(&id);
    };

    let mut list = ListController::new(form.completed);
    list.mount(state.gateway()).await;
    let confirmation = Confirmation::from_answer(form.confirm.as_deref());
    let outcome = list.delete(state.gateway(), todo_id, confirmation).await;
    debug!(id = %todo_id, ?outcome, "delete request handled");

    Html(views::render_list_fragment_closing_modal(&list, state.today())).into_response()
}

// GET /new - Blank create form
async fn new_todo_page(State(state): State<AppState>) -> Html<String> {
    let create = CreateController::new(state.today());
    Html(views::render_create_page(state.theme(), &create))
}

// POST /new - Create a todo
async fn create_todo(State(state): State<AppState>, Form(fields): Form<TodoFields>) -> Response {
    let mut create = CreateController::with_fields(state.today(), fields);
    match create.submit(state.gateway()).await {
        CreateOutcome::Created(_, route) => Redirect::to(&route.path()).into_response(),
        CreateOutcome::Invalid | CreateOutcome::Failed => {
            Html(views::render_create_page(state.theme(), &create)).into_response()
        }
    }
}

// GET /edit/:id - Edit form for an existing todo
async fn edit_todo_page(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(todo_id) = parse_id(&id) else {
        return not_found_page(&state, &id);
    };

    let mut editor = EditorController::new(todo_id);
    editor.load(state.gateway()).await;
    Html(views::render_editor_page(state.theme(), &editor)).into_response()
}

// POST /edit/:id - Save changes to an existing todo
async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(fields): Form<TodoFields>,
) -> Response {
    let Some(todo_id) = parse_id(&id) else {
        return not_found_page(&state, &id);
    };

    let mut editor = EditorController::new(todo_id);
    editor.load(state.gateway()).await;
    if !editor.set_fields(fields) {
        return Html(views::render_editor_page(state.theme(), &editor)).into_response();
    }

    match editor.submit(state.gateway()).await {
        EditorOutcome::Saved(route) => Redirect::to(&route.path()).into_response(),
        EditorOutcome::Invalid | EditorOutcome::Failed | EditorOutcome::NotReady => {
            Html(views::render_editor_page(state.theme(), &editor)).into_response()
        }
    }
}

// GET /stats - Summary counts
async fn stats_page(State(state): State<AppState>) -> Html<String> {
    let mut controller = StatsController::new(state.today());
    controller.mount(state.gateway()).await;
    Html(views::render_stats_page(state.theme(), &controller))
}
