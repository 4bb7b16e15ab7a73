//! Backup export and import endpoints

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;

use todo_core::transfer::{decode_import, export_file_name};

use super::{core_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: usize,
}

#[derive(Debug, Serialize)]
pub struct BackupResponse {
    pub path: String,
}

/// GET /api/todos/export - Download the collection as a backup file
async fn export_todos(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let document = state
        .session()
        .read()
        .await
        .export_document()
        .map_err(core_error)?;

    let disposition = format!("attachment; filename=\"{}\"", export_file_name(Utc::now()));
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document,
    ))
}

/// POST /api/todos/backup - Write a backup file into the data directory
async fn write_backup(State(state): State<AppState>) -> Result<Json<BackupResponse>, ApiError> {
    let dir = state.data_dir().join("backups");
    let path = state
        .session()
        .read()
        .await
        .export_to_file(&dir)
        .await
        .map_err(core_error)?;

    Ok(Json(BackupResponse {
        path: path.to_string_lossy().to_string(),
    }))
}

/// POST /api/todos/import - Replace the collection from an uploaded backup
///
/// Only one import runs at a time; the body is parsed before the session is
/// locked, and the collection only changes once parsing succeeded.
async fn import_todos(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ImportResponse>, ApiError> {
    let ticket = state.import_guard().begin().map_err(core_error)?;

    let tasks = decode_import(&body).map_err(|e| {
        tracing::warn!("Rejected import: {}", e);
        core_error(e)
    })?;

    let imported = state.session().write().await.apply_import(ticket, tasks).await;
    Ok(Json(ImportResponse { imported }))
}

/// Transfer routes; import uploads are capped at `max_import_bytes`
pub fn router(max_import_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/api/todos/export", get(export_todos))
        .route("/api/todos/backup", post(write_backup))
        .route(
            "/api/todos/import",
            post(import_todos).layer(DefaultBodyLimit::max(max_import_bytes)),
        )
}
