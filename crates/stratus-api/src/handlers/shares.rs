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
use stratus_core::models::ShareFileResponse;
use uuid::Uuid;

/// Publish a public share link for a file
#[utoipa::path(
    post,
    path = "/api/v1/files/{id}/share",
    tag = "shares",
    params(("id" = Uuid, Path, description = "File id")),
    responses(
        (status = 200, description = "Share link published", body = ShareFileResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %session.user_id, file_id = %id))]
pub async fn share_file(
    session: SessionContext,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (share_token, view_url) = state.shares.share_file(session.user_id, id).await?;

    Ok(Json(ShareFileResponse {
        success: true,
        share_token,
        view_url,
    }))
}

/// Anonymous download through a share token. No session required; the
/// token is the capability.
#[utoipa::path(
    get,
    path = "/api/v1/share/{token}/download",
    tag = "shares",
    params(("token" = String, Path, description = "Share token")),
    responses(
        (status = 200, description = "File content stream"),
        (status = 404, description = "Share link not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn shared_download(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (record, stream) = state.shares.download_by_token(&token).await?;

    let headers = [
        (header::CONTENT_TYPE, record.mime_type.clone()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", record.name.replace('"', "")),
        ),
    ];

    Ok((headers, Body::from_stream(stream)))
}
