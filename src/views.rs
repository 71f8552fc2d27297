use chrono::NaiveDate;
use hypertext::{prelude::*, Raw};

use crate::config::Theme;
use crate::create::CreateController;
use crate::editor::{EditorController, EditorPhase};
use crate::fields::{FieldErrors, TodoFields};
use crate::list::{ListController, TodoRow};
use crate::nav::Route;
use crate::stats::StatsController;
use crate::todo::{Priority, Status, TodoId};

// Empties the dialog container when returned alongside a list fragment.
const CLOSE_MODAL_OOB: &str = r#"<div id="modal-container" hx-swap-oob="true"></div>"#;

// ============================================================================
// Layout
// ============================================================================

pub fn page(theme: Theme, page_title: &str, active: Route, body_html: &str) -> String {
    let nav_html = render_nav(active);

    maud! {
        !DOCTYPE
        html {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (page_title) " - Todos" }
                link rel="stylesheet" href="/static/app.css";
                script src="https://unpkg.com/htmx.org@2.0.4" {}
            }
            body class=(theme.css_class()) {
                div .container {
                    (Raw::dangerously_create(body_html))
                }
                (Raw::dangerously_create(&nav_html))
            }
        }
    }
    .render()
    .into_inner()
}

fn render_nav(active: Route) -> String {
    let links: Vec<(String, &str, String)> = Route::NAV_BAR
        .iter()
        .map(|route| {
            let link_class = if *route == active { "nav-link nav-link-active" } else { "nav-link" };
            (route.path(), route.label(), link_class.to_string())
        })
        .collect();

    maud! {
        div .bottom-nav {
            @for (href, link_label, link_class) in &links {
                a class=(link_class) href=(href) { (link_label) }
            }
        }
    }
    .render()
    .into_inner()
}

pub fn render_not_found(theme: Theme, message: &str) -> String {
    let body = maud! {
        h1 { "Not Found" }
        p .error-banner { (message) }
        a href="/" { "Back to tasks" }
    }
    .render()
    .into_inner();

    page(theme, "Not Found", Route::List, &body)
}

/// Escaped error message for fragment endpoints.
pub fn render_error_fragment(message: &str) -> String {
    maud! {
        div .error-banner { (message) }
    }
    .render()
    .into_inner()
}

// ============================================================================
// List
// ============================================================================

pub fn render_list_page(theme: Theme, list: &ListController, today: NaiveDate) -> String {
    let list_html = render_list_fragment(list, today);

    let body = maud! {
        h1 { "To-Do List" }
        div #todo-list {
            (Raw::dangerously_create(&list_html))
        }
        div #modal-container {}
    }
    .render()
    .into_inner();

    page(theme, "Tasks", Route::List, &body)
}

/// The swappable part of the list page: toggle, error banner and rows.
pub fn render_list_fragment(list: &ListController, today: NaiveDate) -> String {
    let show_completed = list.show_completed();
    let rows = list.rows(today);
    let items: Vec<String> = rows
        .iter()
        .map(|row| render_row(row, list.edit(row.todo.id), show_completed))
        .collect();
    let toggle_html = render_completed_toggle(show_completed);
    let error = list.error().unwrap_or("");
    let empty_message = if show_completed {
        "No completed tasks yet."
    } else {
        "Nothing to do. Add a task!"
    };

    maud! {
        div .list-controls {
            (Raw::dangerously_create(&toggle_html))
        }
        @if !error.is_empty() {
            div .error-banner { (error) }
        }
        @if items.is_empty() {
            div .empty-list {
                p { (empty_message) }
            }
        } @else {
            ul .todo-list {
                (Raw::dangerously_create(&items.join("\n")))
            }
        }
    }
    .render()
    .into_inner()
}

/// List fragment for a mutation that was started from the delete dialog.
pub fn render_list_fragment_closing_modal(list: &ListController, today: NaiveDate) -> String {
    format!("{}{}", render_list_fragment(list, today), CLOSE_MODAL_OOB)
}

fn render_completed_toggle(show_completed: bool) -> String {
    let checked = if show_completed { " checked" } else { "" };

    format!(
        r##"<label class="toggle">
            <input type="checkbox" name="completed" value="true"{checked} hx-get="/todos" hx-target="#todo-list" hx-swap="innerHTML" hx-trigger="change" hx-disabled-elt="this">
            Show completed
        </label>"##
    )
}

fn render_row(row: &TodoRow<'_>, edit: Route, show_completed: bool) -> String {
    let todo = row.todo;
    let edit_url = edit.path();
    let row_class = if row.overdue {
        "todo-item todo-item-overdue"
    } else {
        "todo-item"
    };
    let status_class = format!("todo-status todo-status-{}", todo.status.as_str());
    let priority_class = format!("priority-flag priority-{}", todo.priority.as_str());
    let detail = todo.detail.as_deref().unwrap_or("");
    let due = todo.due_date.format("%b %-d, %Y").to_string();
    let actions = render_row_actions(todo.id, todo.status, &edit_url, show_completed);

    maud! {
        li class=(row_class) {
            span class=(status_class) { (todo.status.label()) }
            div .todo-body {
                div .todo-heading {
                    a .todo-title href=(edit_url) { (todo.task) }
                    span class=(priority_class) { (todo.priority.label()) }
                }
                @if !detail.is_empty() {
                    p .todo-detail { (detail) }
                }
                span .todo-due { "Due: " (due) }
                @if row.overdue {
                    span .overdue-badge { "Overdue" }
                }
            }
            div .todo-actions {
                (Raw::dangerously_create(&actions))
            }
        }
    }
    .render()
    .into_inner()
}

fn render_row_actions(id: TodoId, status: Status, edit_url: &str, show_completed: bool) -> String {
    let complete_button = if status == Status::Completed {
        String::new()
    } else {
        format!(
            r##"<button class="btn" hx-post="/todos/{id}/complete?completed={show_completed}" hx-target="#todo-list" hx-swap="innerHTML" hx-disabled-elt="this">Complete</button>"##
        )
    };

    format!(
        r##"{complete_button}
        <a class="btn" href="{edit_url}">Edit</a>
        <button class="btn" hx-get="/todos/{id}/delete?completed={show_completed}" hx-target="#modal-container" hx-swap="innerHTML">Delete</button>"##
    )
}

/// Non-blocking confirmation dialog. Only its Delete button sends the
/// `confirm=yes` answer; Cancel closes it without contacting the server.
pub fn render_delete_dialog(id: TodoId, show_completed: bool) -> String {
    format!(
        r##"<div class="modal-overlay">
            <div class="window dialog" role="dialog" aria-modal="true">
                <h2>Delete task?</h2>
                <p>This cannot be undone.</p>
                <form>
                    <input type="hidden" name="confirm" value="yes">
                    <input type="hidden" name="completed" value="{show_completed}">
                    <button class="btn" type="button" onclick="document.getElementById('modal-container').innerHTML = ''">Cancel</button>
                    <button class="btn btn-danger" type="button" hx-post="/todos/{id}/delete" hx-include="closest form" hx-target="#todo-list" hx-swap="innerHTML" hx-disabled-elt="this">Delete</button>
                </form>
            </div>
        </div>"##
    )
}

// ============================================================================
// Forms
// ============================================================================

pub fn render_create_page(theme: Theme, create: &CreateController) -> String {
    let form_html = render_todo_form(
        &Route::Create.path(),
        create.fields(),
        create.field_errors(),
        create.error(),
        "Add Task",
    );

    let body = maud! {
        h1 { "Add New Task" }
        (Raw::dangerously_create(&form_html))
    }
    .render()
    .into_inner();

    page(theme, "New Task", Route::Create, &body)
}

pub fn render_editor_page(theme: Theme, editor: &EditorController) -> String {
    let body = if editor.phase() == EditorPhase::Error {
        let message = editor.error().unwrap_or("Failed to fetch the task.");
        maud! {
            h1 { "Edit Task" }
            div .error-banner { (message) }
            a href="/" { "Back to tasks" }
        }
        .render()
        .into_inner()
    } else {
        let form_html = render_todo_form(
            &Route::Edit(editor.id()).path(),
            editor.fields(),
            editor.field_errors(),
            editor.error(),
            "Update Task",
        );
        maud! {
            h1 { "Edit Task" }
            (Raw::dangerously_create(&form_html))
        }
        .render()
        .into_inner()
    };

    page(theme, "Edit Task", Route::Edit(editor.id()), &body)
}

fn render_todo_form(
    action: &str,
    fields: &TodoFields,
    errors: &FieldErrors,
    error: Option<&str>,
    submit_label: &str,
) -> String {
    let priority_options: Vec<(&str, &str)> = Priority::ALL.iter().map(|p| (p.as_str(), p.label())).collect();
    let status_options: Vec<(&str, &str)> = Status::ALL.iter().map(|s| (s.as_str(), s.label())).collect();
    let priority_select = render_select("todo-priority", "priority", &fields.priority, Some("Select priority"), &priority_options);
    let status_select = render_select("todo-status", "status", &fields.status, None, &status_options);
    let error = error.unwrap_or("");
    let task_error = errors.task.as_deref().unwrap_or("");
    let due_error = errors.due_date.as_deref().unwrap_or("");
    let priority_error = errors.priority.as_deref().unwrap_or("");
    let status_error = errors.status.as_deref().unwrap_or("");

    let inner = maud! {
        @if !error.is_empty() {
            div .error-banner { (error) }
        }
        div .form-group {
            label for="todo-task" { "Task" }
            input type="text" id="todo-task" name="task" value=(fields.task) required;
            @if !task_error.is_empty() {
                div .field-error { (task_error) }
            }
        }
        div .form-group {
            label for="todo-detail" { "Detail" }
            textarea id="todo-detail" name="detail" rows="4" { (fields.detail) }
        }
        div .form-group {
            label for="todo-due-date" { "Due Date" }
            input type="date" id="todo-due-date" name="due_date" value=(fields.due_date) required;
            @if !due_error.is_empty() {
                div .field-error { (due_error) }
            }
        }
        div .form-group {
            label for="todo-priority" { "Priority" }
            (Raw::dangerously_create(&priority_select))
            @if !priority_error.is_empty() {
                div .field-error { (priority_error) }
            }
        }
        div .form-group {
            label for="todo-status" { "Status" }
            (Raw::dangerously_create(&status_select))
            @if !status_error.is_empty() {
                div .field-error { (status_error) }
            }
        }
        (Raw::dangerously_create(&format!(
            r#"<button class="btn btn-default" type="submit">{}</button>"#,
            submit_label
        )))
    }
    .render()
    .into_inner();

    // Boosted so the submit button stays disabled while the request is out.
    format!(
        r#"<form class="todo-form" method="post" action="{action}" hx-boost="true" hx-disabled-elt="find button[type='submit']">{inner}</form>"#
    )
}

fn render_select(
    id: &str,
    name: &str,
    current: &str,
    placeholder: Option<&str>,
    options: &[(&str, &str)],
) -> String {
    let placeholder_html = placeholder
        .map(|text| {
            let selected = if current.is_empty() { " selected" } else { "" };
            format!(r#"<option value=""{selected}>{text}</option>"#)
        })
        .unwrap_or_default();
    let options_html: String = options
        .iter()
        .map(|(value, text)| {
            let selected = if *value == current { " selected" } else { "" };
            format!(r#"<option value="{value}"{selected}>{text}</option>"#)
        })
        .collect();

    format!(r#"<select id="{id}" name="{name}">{placeholder_html}{options_html}</select>"#)
}

// ============================================================================
// Stats
// ============================================================================

pub fn render_stats_page(theme: Theme, controller: &StatsController) -> String {
    let error = controller.error().unwrap_or("");
    let stats = controller.stats().cloned().unwrap_or_default();
    let status_rows: Vec<(&str, String)> = Status::ALL
        .iter()
        .map(|s| (s.label(), stats.count(*s).to_string()))
        .collect();
    let priority_rows: Vec<(&str, String)> = Priority::ALL
        .iter()
        .map(|p| (p.label(), stats.count_priority(*p).to_string()))
        .collect();

    let body = maud! {
        h1 { "Statistics" }
        @if !error.is_empty() {
            div .error-banner { (error) }
        }
        div .stats-summary {
            div .stat-card {
                span .stat-value { (stats.total.to_string()) }
                span .stat-label { "Tasks" }
            }
            div .stat-card {
                span .stat-value { (stats.overdue.to_string()) }
                span .stat-label { "Overdue" }
            }
            div .stat-card {
                span .stat-value { (stats.completion_percent().to_string()) "%" }
                span .stat-label { "Completed" }
            }
        }
        h2 { "By status" }
        table .stats-table {
            @for (name, count) in &status_rows {
                tr {
                    th { (name) }
                    td { (count) }
                }
            }
        }
        h2 { "By priority" }
        table .stats-table {
            @for (name, count) in &priority_rows {
                tr {
                    th { (name) }
                    td { (count) }
                }
            }
        }
    }
    .render()
    .into_inner();

    page(theme, "Statistics", Route::Stats, &body)
}
