//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use tasks_core::task::TaskRepository;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    storage: &'static str,
}

async fn health_check<R: TaskRepository + 'static>(
    State(state): State<AppState<R>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.repository().backend_name(),
    })
}

pub fn router<R: TaskRepository + 'static>() -> Router<AppState<R>> {
    Router::new().route("/health", get(health_check::<R>))
}
