use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/tasks", post(handlers::add_task))
        .route("/roommates", post(handlers::add_roommate))
        .route("/task-types", post(handlers::add_task_type))
        .route("/api/views/tasks", get(handlers::tasks_view))
        .route("/api/views/analytics", get(handlers::analytics_view))
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
}
