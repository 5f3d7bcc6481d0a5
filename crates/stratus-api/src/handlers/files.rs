use crate::auth::SessionContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use stratus_core::models::{FileActionResponse, RenameFileRequest};
use stratus_core::AppError;
use uuid::Uuid;
use validator::Validate;

/// Move a file to trash. Local state always changes; a failed provider
/// sync degrades to a warning in the response.
#[utoipa::path(
    delete,
    path = "/api/v1/files/{id}",
    tag = "files",
    params(("id" = Uuid, Path, description = "File id")),
    responses(
        (status = 200, description = "File trashed", body = FileActionResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %session.user_id, file_id = %id))]
pub async fn delete_file(
    session: SessionContext,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let response = state.files.delete_file(session.user_id, id).await?;
    Ok(Json(response))
}

/// Restore a file from trash
#[utoipa::path(
    post,
    path = "/api/v1/files/{id}/restore",
    tag = "files",
    params(("id" = Uuid, Path, description = "File id")),
    responses(
        (status = 200, description = "File restored", body = FileActionResponse),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 502, description = "Provider restore failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %session.user_id, file_id = %id))]
pub async fn restore_file(
    session: SessionContext,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.files.restore_file(session.user_id, id).await?;
    Ok(Json(FileActionResponse::ok()))
}

/// Permanently delete a file. Provider-side delete must succeed first.
#[utoipa::path(
    delete,
    path = "/api/v1/files/{id}/permanent",
    tag = "files",
    params(("id" = Uuid, Path, description = "File id")),
    responses(
        (status = 200, description = "File permanently deleted", body = FileActionResponse),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 502, description = "Provider delete failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %session.user_id, file_id = %id))]
pub async fn delete_file_permanently(
    session: SessionContext,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state
        .files
        .delete_file_permanently(session.user_id, id)
        .await?;
    Ok(Json(FileActionResponse::ok()))
}

/// Rename a file. The provider rename is best-effort.
#[utoipa::path(
    patch,
    path = "/api/v1/files/{id}",
    tag = "files",
    params(("id" = Uuid, Path, description = "File id")),
    request_body = RenameFileRequest,
    responses(
        (status = 200, description = "File renamed", body = FileActionResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(user_id = %session.user_id, file_id = %id))]
pub async fn rename_file(
    session: SessionContext,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<RenameFileRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate().map_err(AppError::from)?;
    state
        .files
        .rename_file(session.user_id, id, &request.name)
        .await?;
    Ok(Json(FileActionResponse::ok()))
}

/// Stream a file's content through the server without buffering it.
#[utoipa::path(
    get,
    path = "/api/v1/files/{id}/download",
    tag = "files",
    params(("id" = Uuid, Path, description = "File id")),
    responses(
        (status = 200, description = "File content stream"),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %session.user_id, file_id = %id))]
pub async fn download_file(
    session: SessionContext,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (record, stream) = state.files.download_stream(session.user_id, id).await?;

    let headers = [
        (header::CONTENT_TYPE, record.mime_type.clone()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", record.name.replace('"', "")),
        ),
    ];

    Ok((headers, Body::from_stream(stream)))
}
