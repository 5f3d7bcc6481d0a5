use crate::auth::SessionContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use stratus_core::models::{
    CreateFolderRequest, CreateFolderResponse, FileActionResponse, FolderContentsResponse,
    FolderPurgeResponse, FolderResponse,
};
use stratus_core::AppError;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ContentsQuery {
    /// Folder to list; omitted means root.
    pub folder_id: Option<Uuid>,
}

/// Create a folder
#[utoipa::path(
    post,
    path = "/api/v1/folders",
    tag = "folders",
    request_body = CreateFolderRequest,
    responses(
        (status = 200, description = "Folder created", body = CreateFolderResponse),
        (status = 400, description = "Duplicate name in parent", body = ErrorResponse),
        (status = 404, description = "Parent folder not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(user_id = %session.user_id))]
pub async fn create_folder(
    session: SessionContext,
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateFolderRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate().map_err(AppError::from)?;

    let folder = state
        .folders
        .create_folder(session.user_id, &request.name, request.parent_id)
        .await?;

    Ok(Json(CreateFolderResponse {
        success: true,
        folder: FolderResponse::from(folder),
    }))
}

/// List one folder level (or the root when no folder_id is given)
#[utoipa::path(
    get,
    path = "/api/v1/folders/contents",
    tag = "folders",
    params(ContentsQuery),
    responses(
        (status = 200, description = "Folder contents", body = FolderContentsResponse),
        (status = 404, description = "Folder not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %session.user_id))]
pub async fn folder_contents(
    session: SessionContext,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ContentsQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let contents = state
        .folders
        .contents(session.user_id, query.folder_id)
        .await?;
    Ok(Json(contents))
}

/// Move a folder to trash. Folders are virtual, so this is local-only.
#[utoipa::path(
    delete,
    path = "/api/v1/folders/{id}",
    tag = "folders",
    params(("id" = Uuid, Path, description = "Folder id")),
    responses(
        (status = 200, description = "Folder trashed", body = FileActionResponse),
        (status = 404, description = "Folder not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %session.user_id, folder_id = %id))]
pub async fn delete_folder(
    session: SessionContext,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.folders.delete_folder(session.user_id, id).await?;
    Ok(Json(FileActionResponse::ok()))
}

/// Restore a folder from trash
#[utoipa::path(
    post,
    path = "/api/v1/folders/{id}/restore",
    tag = "folders",
    params(("id" = Uuid, Path, description = "Folder id")),
    responses(
        (status = 200, description = "Folder restored", body = FileActionResponse),
        (status = 404, description = "Folder not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %session.user_id, folder_id = %id))]
pub async fn restore_folder(
    session: SessionContext,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.folders.restore_folder(session.user_id, id).await?;
    Ok(Json(FileActionResponse::ok()))
}

/// Permanently delete a folder subtree: every contained file goes through
/// the single-file permanent delete, then the folder documents are
/// removed. Files that fail to delete are reported as residuals.
#[utoipa::path(
    delete,
    path = "/api/v1/folders/{id}/permanent",
    tag = "folders",
    params(("id" = Uuid, Path, description = "Folder id")),
    responses(
        (status = 200, description = "Folder purged", body = FolderPurgeResponse),
        (status = 404, description = "Folder not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %session.user_id, folder_id = %id))]
pub async fn delete_folder_permanently(
    session: SessionContext,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let outcome = state
        .folders
        .delete_folder_permanently(session.user_id, id)
        .await?;

    Ok(Json(FolderPurgeResponse {
        success: true,
        folders_removed: outcome.folders_removed,
        files_removed: outcome.files_removed,
        residual_file_ids: outcome
            .residual_files
            .iter()
            .map(|(file_id, _)| *file_id)
            .collect(),
    }))
}
