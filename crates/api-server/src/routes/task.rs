//! Task API endpoints
//!
//! RESTful API over the live task session.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use todo_core::session::TodoSession;
use todo_core::storage::{FileStorage, StorageStats};
use todo_core::task::{normalize_priority, Priority, Task, TaskId};
use todo_core::view::{relative_date, SortCriterion, StatusFilter, TaskStats};
use todo_core::Error;

use super::{core_error, ApiError};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub text: String,
    #[serde(default)]
    pub priority: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditTaskRequest {
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    /// "Today", "Yesterday", "3 days ago" or a short date
    pub created_label: String,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub removed: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStatusResponse {
    #[serde(flatten)]
    pub stats: StorageStats,
    pub durable: bool,
    pub recovered_from_corrupt: bool,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            created_label: relative_date(task.created_at, Utc::now()),
            id: task.id,
            text: task.text,
            completed: task.completed,
            priority: task.priority,
            created_at: task.created_at,
        }
    }
}

fn not_found(id: &TaskId) -> ApiError {
    core_error(Error::TaskNotFound(id.to_string()))
}

fn warn_if_not_durable(session: &TodoSession<FileStorage>) {
    if !session.is_durable() {
        tracing::warn!("Last change was not written to storage");
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/todos - Filtered and sorted view
async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<TaskResponse>> {
    let status = query.status.as_deref().map(StatusFilter::from).unwrap_or_default();
    let criterion = query.sort.as_deref().map(SortCriterion::from).unwrap_or_default();

    let session = state.session().read().await;
    let tasks = session.filtered_sorted(status, criterion);
    Json(tasks.into_iter().map(TaskResponse::from).collect())
}

/// POST /api/todos - Add a task
async fn create_task(
    State(state): State<AppState>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let priority = req
        .priority
        .as_deref()
        .map(normalize_priority)
        .unwrap_or_default();

    let mut session = state.session().write().await;
    let created = session.add(&req.text, priority).await.map_err(core_error)?;
    warn_if_not_durable(&session);

    tracing::info!("Added todo {}", created.id);
    Ok((StatusCode::CREATED, Json(TaskResponse::from(created))))
}

/// GET /api/todos/:id - Get a single task
async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TaskResponse>, ApiError> {
    let id = TaskId::from(id);
    let session = state.session().read().await;

    session
        .tasks()
        .iter()
        .find(|task| task.id == id)
        .cloned()
        .map(|task| Json(TaskResponse::from(task)))
        .ok_or_else(|| not_found(&id))
}

/// PATCH /api/todos/:id - Edit the text of a task
async fn edit_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<EditTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let id = TaskId::from(id);
    let mut session = state.session().write().await;

    let edited = session.edit(&id, &req.text).await.map_err(core_error)?;
    warn_if_not_durable(&session);

    edited
        .map(|task| Json(TaskResponse::from(task)))
        .ok_or_else(|| not_found(&id))
}

/// POST /api/todos/:id/toggle - Flip completion
async fn toggle_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TaskResponse>, ApiError> {
    let id = TaskId::from(id);
    let mut session = state.session().write().await;

    let toggled = session.toggle(&id).await.ok_or_else(|| not_found(&id))?;
    warn_if_not_durable(&session);
    Ok(Json(TaskResponse::from(toggled)))
}

/// DELETE /api/todos/:id - Delete a task
async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = TaskId::from(id);
    let mut session = state.session().write().await;

    if session.delete(&id).await {
        warn_if_not_durable(&session);
        tracing::info!("Deleted todo {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(&id))
    }
}

/// POST /api/todos/clear-completed - Remove completed tasks
///
/// Clients confirm with the user before calling this.
async fn clear_completed(State(state): State<AppState>) -> Json<ClearResponse> {
    let mut session = state.session().write().await;
    let removed = session.clear_completed().await;
    warn_if_not_durable(&session);

    tracing::info!("Cleared {} completed todos", removed);
    Json(ClearResponse { removed })
}

/// DELETE /api/todos - Remove every task
async fn clear_all(State(state): State<AppState>) -> Json<ClearResponse> {
    let mut session = state.session().write().await;
    let removed = session.clear_all().await;
    warn_if_not_durable(&session);

    tracing::info!("Cleared all {} todos", removed);
    Json(ClearResponse { removed })
}

/// POST /api/todos/reset - Replace everything with sample tasks
async fn reset_to_sample(State(state): State<AppState>) -> Json<Vec<TaskResponse>> {
    let mut session = state.session().write().await;
    session.reset_to_sample().await;
    warn_if_not_durable(&session);

    tracing::info!("Reset todos to sample data");
    Json(session.tasks().iter().cloned().map(TaskResponse::from).collect())
}

/// GET /api/todos/stats - Statistics over the full collection
async fn get_stats(State(state): State<AppState>) -> Json<TaskStats> {
    Json(state.session().read().await.stats())
}

/// GET /api/storage/stats - Storage slot introspection
async fn storage_stats(State(state): State<AppState>) -> Json<StorageStatusResponse> {
    let session = state.session().read().await;
    Json(StorageStatusResponse {
        stats: session.storage_stats().await,
        durable: session.is_durable(),
        recovered_from_corrupt: session.recovered_from_corrupt(),
    })
}

/// DELETE /api/storage - Remove the saved slot, keeping todos in memory
async fn forget_storage(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    let mut session = state.session().write().await;
    if !session.forget_storage().await {
        return Err(core_error(Error::Storage(
            "Failed to remove saved todos".to_string(),
        )));
    }

    tracing::info!("Removed saved todos from storage");
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Router
// ============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/todos", get(list_tasks).post(create_task).delete(clear_all))
        .route("/api/todos/stats", get(get_stats))
        .route("/api/todos/clear-completed", post(clear_completed))
        .route("/api/todos/reset", post(reset_to_sample))
        .route(
            "/api/todos/{id}",
            get(get_task).patch(edit_task).delete(delete_task),
        )
        .route("/api/todos/{id}/toggle", post(toggle_task))
        .route("/api/storage", delete(forget_storage))
        .route("/api/storage/stats", get(storage_stats))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::{config::Config, state::AppState};

    async fn build_app(seed_sample: bool) -> (Router, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            port: 0,
            seed_sample,
            max_import_bytes: 1024 * 1024,
        };
        let state = AppState::new(&config).await;
        (super::router().with_state(state), temp_dir)
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, payload)
    }

    #[tokio::test]
    async fn create_list_and_stats() {
        let (app, _tmp) = build_app(false).await;

        let (status, created) = send(
            &app,
            "POST",
            "/api/todos",
            Some(json!({"text": "  Water plants ", "priority": "high"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["text"], "Water plants");
        assert_eq!(created["priority"], "high");
        assert_eq!(created["completed"], false);
        assert_eq!(created["createdLabel"], "Today");
        assert!(created["createdAt"].as_str().unwrap().ends_with('Z'));

        let (status, _) = send(
            &app,
            "POST",
            "/api/todos",
            Some(json!({"text": "Call mom", "priority": "whenever"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, listed) = send(&app, "GET", "/api/todos?sort=priority", None).await;
        assert_eq!(status, StatusCode::OK);
        let listed = listed.as_array().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0]["text"], "Water plants");
        assert_eq!(listed[1]["priority"], "medium");

        let (_, stats) = send(&app, "GET", "/api/todos/stats", None).await;
        assert_eq!(stats["total"], 2);
        assert_eq!(stats["pending"], 2);
        assert_eq!(stats["byPriority"]["high"], 1);
    }

    #[tokio::test]
    async fn create_rejects_empty_text() {
        let (app, _tmp) = build_app(false).await;

        let body = Some(json!({"text": "   "}));
        let (status, payload) = send(&app, "POST", "/api/todos", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload["details"][0], "Task description is required");

        let (_, listed) = send(&app, "GET", "/api/todos", None).await;
        assert!(listed.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn toggle_edit_delete_flow() {
        let (app, _tmp) = build_app(false).await;
        let (_, created) = send(&app, "POST", "/api/todos", Some(json!({"text": "Draft"}))).await;
        let id = created["id"].as_str().unwrap().to_string();

        let toggle_uri = format!("/api/todos/{}/toggle", id);
        let (status, toggled) = send(&app, "POST", &toggle_uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(toggled["completed"], true);

        let (status, edited) = send(
            &app,
            "PATCH",
            &format!("/api/todos/{}", id),
            Some(json!({"text": "Final"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(edited["text"], "Final");

        let (status, _) = send(
            &app,
            "PATCH",
            &format!("/api/todos/{}", id),
            Some(json!({"text": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, completed) = send(&app, "GET", "/api/todos?status=completed", None).await;
        assert_eq!(completed.as_array().unwrap().len(), 1);
        assert_eq!(completed[0]["text"], "Final");

        let (status, _) = send(&app, "DELETE", &format!("/api/todos/{}", id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, "DELETE", &format!("/api/todos/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "GET", &format!("/api/todos/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn toggle_unknown_is_not_found() {
        let (app, _tmp) = build_app(false).await;
        let (status, payload) = send(&app, "POST", "/api/todos/nope/toggle", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(payload["error"], "Task not found: nope");
    }

    #[tokio::test]
    async fn reset_and_clear() {
        let (app, _tmp) = build_app(false).await;

        let (status, reset) = send(&app, "POST", "/api/todos/reset", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reset.as_array().unwrap().len(), 5);

        let (_, cleared) = send(&app, "POST", "/api/todos/clear-completed", None).await;
        assert_eq!(cleared["removed"], 1);

        let (_, cleared) = send(&app, "DELETE", "/api/todos", None).await;
        assert_eq!(cleared["removed"], 4);

        let (_, storage) = send(&app, "GET", "/api/storage/stats", None).await;
        assert_eq!(storage["hasData"], true);
        assert_eq!(storage["itemCount"], 0);
        assert_eq!(storage["durable"], true);
    }

    #[tokio::test]
    async fn state_survives_restart() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            port: 0,
            seed_sample: true,
            max_import_bytes: 1024 * 1024,
        };

        {
            let app = super::router().with_state(AppState::new(&config).await);
            let (_, listed) = send(&app, "GET", "/api/todos", None).await;
            assert_eq!(listed.as_array().unwrap().len(), 5);
            send(&app, "DELETE", "/api/todos", None).await;
        }

        let app = super::router().with_state(AppState::new(&config).await);
        let (_, listed) = send(&app, "GET", "/api/todos", None).await;
        assert!(listed.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn forget_storage_drops_slot_but_keeps_todos() {
        let (app, _tmp) = build_app(true).await;

        let (status, _) = send(&app, "DELETE", "/api/storage", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, stats) = send(&app, "GET", "/api/storage/stats", None).await;
        assert_eq!(stats["hasData"], false);
        assert_eq!(stats["durable"], false);

        let (_, listed) = send(&app, "GET", "/api/todos", None).await;
        assert_eq!(listed.as_array().unwrap().len(), 5);
    }
}
