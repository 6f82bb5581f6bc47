use crate::analytics::AnalyticsPage;
use crate::errors::AppError;
use crate::management::{Submission, TaskPage, TaskSelection};
use crate::models::parse_completed_on;
use crate::shell::Tab;
use crate::state::AppState;
use crate::ui::{render_analytics, render_tasks};
use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
    Form, Json,
};
use serde::Deserialize;
use tokio::task::JoinHandle;
use tracing::{debug, error};

#[derive(Debug, Default, Deserialize)]
pub struct TabQuery {
    pub tab: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TaskSubmission {
    pub task_name: String,
    pub date: String,
    pub roommate_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NameSubmission {
    pub name: String,
}

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<TabQuery>,
) -> Result<Html<String>, AppError> {
    let tab = match query.tab.as_deref() {
        None | Some("") => Tab::default(),
        Some(raw) => raw.parse::<Tab>().map_err(AppError::bad_request)?,
    };

    let shell = &state.shell;
    settle(shell.activate(tab)).await;
    let html = match tab {
        Tab::Tasks => render_tasks(&shell.tasks.take_page().await),
        Tab::Analytics => render_analytics(&shell.analytics.take_page().await),
    };
    Ok(Html(html))
}

pub async fn add_task(
    State(state): State<AppState>,
    Form(form): Form<TaskSubmission>,
) -> Result<Redirect, AppError> {
    let date = match form.date.trim() {
        "" => None,
        raw => Some(
            parse_completed_on(raw)
                .ok_or_else(|| AppError::bad_request(format!("invalid date '{raw}'")))?,
        ),
    };

    let selection = TaskSelection {
        task_name: form.task_name,
        date,
        roommate_id: form.roommate_id,
    };
    log_outcome("add task", state.shell.tasks.submit_task(selection).await);
    Ok(Redirect::to("/?tab=tasks"))
}

pub async fn add_roommate(
    State(state): State<AppState>,
    Form(form): Form<NameSubmission>,
) -> Redirect {
    log_outcome("add roommate", state.shell.tasks.submit_roommate(form.name).await);
    Redirect::to("/?tab=tasks")
}

pub async fn add_task_type(
    State(state): State<AppState>,
    Form(form): Form<NameSubmission>,
) -> Redirect {
    log_outcome("add task type", state.shell.tasks.submit_task_type(form.name).await);
    Redirect::to("/?tab=tasks")
}

pub async fn tasks_view(State(state): State<AppState>) -> Json<TaskPage> {
    settle(state.shell.activate(Tab::Tasks)).await;
    Json(state.shell.tasks.page().await)
}

pub async fn analytics_view(State(state): State<AppState>) -> Json<AnalyticsPage> {
    settle(state.shell.activate(Tab::Analytics)).await;
    Json(state.shell.analytics.page().await)
}

pub async fn healthz() -> &'static str {
    "ok"
}

// A load cancelled by a newer activation is not an error; render what is there.
async fn settle(load: JoinHandle<()>) {
    if let Err(err) = load.await {
        if err.is_cancelled() {
            debug!("view load superseded");
        } else {
            error!("view load panicked: {err}");
        }
    }
}

fn log_outcome(action: &str, outcome: Submission) {
    debug!("{action}: {outcome:?}");
}
