//! Task API endpoints
//!
//! RESTful API for task CRUD operations, generic over the storage backend.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use tasks_core::task::{NewTask, Page, Task, TaskRepository, TaskStatus, UpdateTask};

use crate::response::{ApiError, Envelope};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    #[serde(default)]
    pub page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct CreatedTask<I> {
    pub id: I,
}

impl CreateTaskRequest {
    fn into_new_task(self) -> Result<NewTask, ApiError> {
        if self.title.trim().is_empty() {
            return Err(ApiError::Incorrect("title is required".to_string()));
        }
        if self.description.trim().is_empty() {
            return Err(ApiError::Incorrect("description is required".to_string()));
        }
        Ok(NewTask {
            title: self.title,
            description: self.description,
            status: self.status,
        })
    }
}

impl UpdateTaskRequest {
    fn into_update(self) -> Result<UpdateTask, ApiError> {
        let update = UpdateTask::new(self.title, self.description, self.status);
        update.validate()?;
        update
            .status
            .parse::<TaskStatus>()
            .map_err(|e| ApiError::Incorrect(e.to_string()))?;
        Ok(update)
    }
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(req)| req).map_err(|rejection| {
        tracing::debug!(error = %rejection, "Invalid request body");
        ApiError::BadFormat("Invalid request body".to_string())
    })
}

fn task_id<R: TaskRepository>(
    path: Result<Path<String>, PathRejection>,
) -> Result<R::Id, ApiError> {
    let Path(raw) = path.map_err(|_| ApiError::BadFormat("Invalid task id".to_string()))?;
    raw.parse::<R::Id>()
        .map_err(|_| ApiError::BadFormat("Invalid task id".to_string()))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/tasks - Create a new task
async fn create_task<R: TaskRepository + 'static>(
    State(state): State<AppState<R>>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<CreatedTask<R::Id>>>), ApiError> {
    let task = body(payload)?.into_new_task()?;

    let id = state
        .repository()
        .create(&state.op_context(), task)
        .await?;

    tracing::info!(task_id = %id, "Task created");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::success(CreatedTask { id })),
    ))
}

/// GET /v1/tasks/{id} - Get a single task
async fn get_task<R: TaskRepository + 'static>(
    State(state): State<AppState<R>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Envelope<Task<R::Id>>>, ApiError> {
    let id = task_id::<R>(path)?;
    let task = state.repository().get(&state.op_context(), id).await?;
    Ok(Json(Envelope::success(task)))
}

/// GET /v1/tasks?page=N - List one page of tasks
async fn list_tasks<R: TaskRepository + 'static>(
    State(state): State<AppState<R>>,
    query: Result<Query<ListTasksQuery>, QueryRejection>,
) -> Result<Json<Envelope<Vec<Task<R::Id>>>>, ApiError> {
    let Query(query) =
        query.map_err(|_| ApiError::BadFormat("Invalid page parameter".to_string()))?;
    let page = Page::number(query.page.unwrap_or(1), state.page_size());

    let tasks = state.repository().list(&state.op_context(), page).await?;
    Ok(Json(Envelope::success(tasks)))
}

/// DELETE /v1/tasks/{id} - Delete a task
async fn delete_task<R: TaskRepository + 'static>(
    State(state): State<AppState<R>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let id = task_id::<R>(path)?;
    state.repository().delete(&state.op_context(), id).await?;

    tracing::info!(task_id = %id, "Task deleted");
    Ok(Json(Envelope::ok()))
}

/// PUT /v1/tasks/{id} - Overwrite a task
async fn update_task<R: TaskRepository + 'static>(
    State(state): State<AppState<R>>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let id = task_id::<R>(path)?;
    let update = body(payload)?.into_update()?;

    state
        .repository()
        .update(&state.op_context(), id, update)
        .await?;

    tracing::info!(task_id = %id, "Task updated");
    Ok(Json(Envelope::ok()))
}

// ============================================================================
// Router
// ============================================================================

pub fn router<R: TaskRepository + 'static>() -> Router<AppState<R>> {
    Router::new()
        .route("/v1/tasks", get(list_tasks::<R>).post(create_task::<R>))
        .route(
            "/v1/tasks/{id}",
            get(get_task::<R>)
                .put(update_task::<R>)
                .delete(delete_task::<R>),
        )
}
