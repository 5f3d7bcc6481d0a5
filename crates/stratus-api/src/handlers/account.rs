use crate::auth::SessionContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use stratus_core::models::{FileActionResponse, NotificationResponse, StorageSummary};
use stratus_core::AppError;
use utoipa::ToSchema;
use uuid::Uuid;

const NOTIFICATION_PAGE_SIZE: i64 = 20;

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationsResponse {
    pub success: bool,
    pub notifications: Vec<NotificationResponse>,
}

/// Storage usage and quota for the session user
#[utoipa::path(
    get,
    path = "/api/v1/me/storage",
    tag = "account",
    responses(
        (status = 200, description = "Usage summary", body = StorageSummary),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %session.user_id))]
pub async fn storage_summary(
    session: SessionContext,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let user = state
        .users
        .get_user(session.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(StorageSummary::from(&user)))
}

/// Recent notifications, newest first
#[utoipa::path(
    get,
    path = "/api/v1/me/notifications",
    tag = "account",
    responses(
        (status = 200, description = "Notifications", body = NotificationsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %session.user_id))]
pub async fn list_notifications(
    session: SessionContext,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let notifications = state
        .notifications
        .list_for_user(session.user_id, NOTIFICATION_PAGE_SIZE)
        .await?;

    Ok(Json(NotificationsResponse {
        success: true,
        notifications: notifications.into_iter().map(Into::into).collect(),
    }))
}

/// Mark one notification as read
#[utoipa::path(
    post,
    path = "/api/v1/me/notifications/{id}/read",
    tag = "account",
    params(("id" = Uuid, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Marked read", body = FileActionResponse),
        (status = 404, description = "Notification not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %session.user_id))]
pub async fn mark_notification_read(
    session: SessionContext,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let updated = state.notifications.mark_read(session.user_id, id).await?;
    if !updated {
        return Err(AppError::NotFound("Notification not found".to_string()).into());
    }
    Ok(Json(FileActionResponse::ok()))
}
