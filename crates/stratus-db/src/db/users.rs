use stratus_core::{models::User, AppError};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Repository for user records. Account management lives elsewhere; the
/// storage core only reads the usage summary here. Usage counter writes
/// ride inside the file repository's transactions.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select", db.record_id = %id))]
    pub async fn get_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<Postgres, User>(
            "SELECT id, name, email, storage_usage_bytes, storage_quota_bytes, created_at \
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
