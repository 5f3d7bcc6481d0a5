use stratus_core::{
    models::{Notification, NotificationKind},
    AppError,
};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const NOTIFICATION_COLUMNS: &str = "id, user_id, kind, title, message, is_read, created_at";

/// Repository for user notifications
#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, message), fields(db.table = "notifications", db.operation = "insert"))]
    pub async fn create(
        &self,
        user_id: Uuid,
        kind: NotificationKind,
        title: &str,
        message: &str,
    ) -> Result<Notification, AppError> {
        let notification = sqlx::query_as::<Postgres, Notification>(&format!(
            r#"
            INSERT INTO notifications (user_id, kind, title, message)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            NOTIFICATION_COLUMNS
        ))
        .bind(user_id)
        .bind(kind)
        .bind(title)
        .bind(message)
        .fetch_one(&self.pool)
        .await?;

        Ok(notification)
    }

    /// Most recent notifications for a user, newest first.
    #[tracing::instrument(skip(self), fields(db.table = "notifications", db.operation = "select"))]
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Notification>, AppError> {
        let notifications = sqlx::query_as::<Postgres, Notification>(&format!(
            "SELECT {} FROM notifications WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
            NOTIFICATION_COLUMNS
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    #[tracing::instrument(skip(self), fields(db.table = "notifications", db.operation = "update"))]
    pub async fn mark_read(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let rows_affected =
            sqlx::query("UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND id = $2")
                .bind(user_id)
                .bind(id)
                .execute(&self.pool)
                .await?
                .rows_affected();

        Ok(rows_affected > 0)
    }
}
