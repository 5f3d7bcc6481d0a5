use crate::auth::SessionContext;
use crate::constants::MAX_PROXIED_UPLOAD_BYTES;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use stratus_core::models::{
    FileResponse, FinalizeUploadRequest, FinalizeUploadResponse, UploadSessionRequest,
    UploadSessionResponse,
};
use stratus_core::AppError;
use uuid::Uuid;
use validator::Validate;

/// Issue a resumable upload session for a direct-to-provider transfer
#[utoipa::path(
    post,
    path = "/api/v1/uploads/session",
    tag = "uploads",
    request_body = UploadSessionRequest,
    responses(
        (status = 200, description = "Session URL issued", body = UploadSessionResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 502, description = "Provider rejected session creation", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(user_id = %session.user_id, file_name = %request.file_name))]
pub async fn request_upload_session(
    session: SessionContext,
    State(state): State<Arc<AppState>>,
    Json(request): Json<UploadSessionRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate().map_err(AppError::from)?;

    let upload_url = state
        .uploads
        .request_upload_session(session.user_id, &request)
        .await?;

    Ok(Json(UploadSessionResponse {
        success: true,
        upload_url,
    }))
}

/// Persist a completed direct-to-provider upload
#[utoipa::path(
    post,
    path = "/api/v1/uploads/finalize",
    tag = "uploads",
    request_body = FinalizeUploadRequest,
    responses(
        (status = 200, description = "Upload finalized", body = FinalizeUploadResponse),
        (status = 400, description = "Missing file identifier", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(user_id = %session.user_id))]
pub async fn finalize_upload(
    session: SessionContext,
    State(state): State<Arc<AppState>>,
    Json(request): Json<FinalizeUploadRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let record = state
        .uploads
        .finalize(session.user_id, &request.file, request.parent_id)
        .await?;

    Ok(Json(FinalizeUploadResponse {
        success: true,
        file: FileResponse::from(record),
    }))
}

/// Server-proxied upload: the whole file travels through the server in
/// one multipart request. Small files only; the file browser uses the
/// resumable session flow instead.
#[utoipa::path(
    post,
    path = "/api/v1/files",
    tag = "uploads",
    responses(
        (status = 200, description = "File uploaded", body = FinalizeUploadResponse),
        (status = 400, description = "No file provided", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(user_id = %session.user_id))]
pub async fn upload_file(
    session: SessionContext,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut parent_id: Option<Uuid> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Invalid multipart body: {}", e)))?
    {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("file") => {
                let file_name = field
                    .file_name()
                    .unwrap_or("uploaded_file")
                    .to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Failed to read file: {}", e)))?;

                if data.len() > MAX_PROXIED_UPLOAD_BYTES {
                    return Err(AppError::InvalidInput(format!(
                        "File too large for proxied upload ({} bytes); use a resumable session",
                        data.len()
                    ))
                    .into());
                }

                file = Some((file_name, content_type, data.to_vec()));
            }
            Some("parent_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Invalid parent_id: {}", e)))?;
                if !text.is_empty() {
                    parent_id = Some(text.parse().map_err(AppError::from)?);
                }
            }
            _ => {}
        }
    }

    let (file_name, content_type, data) =
        file.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;

    let record = state
        .uploads
        .upload_via_server(session.user_id, &file_name, &content_type, data, parent_id)
        .await?;

    Ok(Json(FinalizeUploadResponse {
        success: true,
        file: FileResponse::from(record),
    }))
}
