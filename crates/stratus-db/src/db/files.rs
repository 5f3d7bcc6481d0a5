use stratus_core::{models::FileRecord, AppError, ProviderKind};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const FILE_COLUMNS: &str = "id, owner_id, folder_id, name, mime_type, size_kb, provider, \
     external_id, external_url, download_url, share_token, is_public, is_starred, is_trash, created_at";

/// Repository for file metadata records
#[derive(Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a file record and increment the owner's usage counter in one
    /// transaction. The increment is a single-statement atomic add, so
    /// concurrent finalizes for the same user never lose updates.
    #[allow(clippy::too_many_arguments)]
    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "insert"))]
    pub async fn create_with_usage(
        &self,
        owner_id: Uuid,
        folder_id: Option<Uuid>,
        name: &str,
        mime_type: &str,
        size_kb: i64,
        provider: ProviderKind,
        external_id: &str,
        external_url: Option<&str>,
        download_url: Option<&str>,
        usage_delta_bytes: i64,
    ) -> Result<FileRecord, AppError> {
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<Postgres, FileRecord>(&format!(
            r#"
            INSERT INTO files (owner_id, folder_id, name, mime_type, size_kb, provider,
                               external_id, external_url, download_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            FILE_COLUMNS
        ))
        .bind(owner_id)
        .bind(folder_id)
        .bind(name)
        .bind(mime_type)
        .bind(size_kb)
        .bind(provider)
        .bind(external_id)
        .bind(external_url)
        .bind(download_url)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE users SET storage_usage_bytes = storage_usage_bytes + $2 WHERE id = $1")
            .bind(owner_id)
            .bind(usage_delta_bytes)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(record)
    }

    /// Remove a file record and decrement the owner's usage counter in one
    /// transaction. Returns false when the record was already gone.
    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "delete", db.record_id = %id))]
    pub async fn delete_with_usage(
        &self,
        owner_id: Uuid,
        id: Uuid,
        size_kb: i64,
    ) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let rows_affected = sqlx::query("DELETE FROM files WHERE owner_id = $1 AND id = $2")
            .bind(owner_id)
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if rows_affected > 0 {
            sqlx::query(
                "UPDATE users SET storage_usage_bytes = storage_usage_bytes - $2 WHERE id = $1",
            )
            .bind(owner_id)
            .bind(size_kb * 1024)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(rows_affected > 0)
    }

    /// Get a file by ID (owner-scoped)
    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "select", db.record_id = %id))]
    pub async fn get_file(&self, owner_id: Uuid, id: Uuid) -> Result<Option<FileRecord>, AppError> {
        let record = sqlx::query_as::<Postgres, FileRecord>(&format!(
            "SELECT {} FROM files WHERE owner_id = $1 AND id = $2",
            FILE_COLUMNS
        ))
        .bind(owner_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Resolve a public share token. Not owner-scoped: share links are
    /// anonymous. Trashed files are not served.
    pub async fn get_by_share_token(&self, token: &str) -> Result<Option<FileRecord>, AppError> {
        let record = sqlx::query_as::<Postgres, FileRecord>(&format!(
            "SELECT {} FROM files WHERE share_token = $1 AND is_public AND NOT is_trash",
            FILE_COLUMNS
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// List files by owner + parent folder + trash flag, sorted by name.
    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "select"))]
    pub async fn list_files(
        &self,
        owner_id: Uuid,
        folder_id: Option<Uuid>,
        in_trash: bool,
    ) -> Result<Vec<FileRecord>, AppError> {
        let records = sqlx::query_as::<Postgres, FileRecord>(&format!(
            "SELECT {} FROM files \
             WHERE owner_id = $1 AND folder_id IS NOT DISTINCT FROM $2 AND is_trash = $3 \
             ORDER BY name ASC",
            FILE_COLUMNS
        ))
        .bind(owner_id)
        .bind(folder_id)
        .bind(in_trash)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// All files contained in any of the given folders, trashed or not.
    /// Used by the recursive folder purge.
    pub async fn list_in_folders(
        &self,
        owner_id: Uuid,
        folder_ids: &[Uuid],
    ) -> Result<Vec<FileRecord>, AppError> {
        let records = sqlx::query_as::<Postgres, FileRecord>(&format!(
            "SELECT {} FROM files WHERE owner_id = $1 AND folder_id = ANY($2)",
            FILE_COLUMNS
        ))
        .bind(owner_id)
        .bind(folder_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Flip the trash flag. Returns false when the record doesn't exist.
    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "update", db.record_id = %id))]
    pub async fn set_trash(
        &self,
        owner_id: Uuid,
        id: Uuid,
        is_trash: bool,
    ) -> Result<bool, AppError> {
        let rows_affected =
            sqlx::query("UPDATE files SET is_trash = $3 WHERE owner_id = $1 AND id = $2")
                .bind(owner_id)
                .bind(id)
                .bind(is_trash)
                .execute(&self.pool)
                .await?
                .rows_affected();

        Ok(rows_affected > 0)
    }

    /// Rename locally. The provider-side rename is the service's concern.
    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "update", db.record_id = %id))]
    pub async fn rename(&self, owner_id: Uuid, id: Uuid, name: &str) -> Result<bool, AppError> {
        let rows_affected =
            sqlx::query("UPDATE files SET name = $3 WHERE owner_id = $1 AND id = $2")
                .bind(owner_id)
                .bind(id)
                .bind(name)
                .execute(&self.pool)
                .await?
                .rows_affected();

        Ok(rows_affected > 0)
    }

    /// Mark a file public and attach its share token.
    pub async fn publish_share(
        &self,
        owner_id: Uuid,
        id: Uuid,
        share_token: &str,
    ) -> Result<bool, AppError> {
        let rows_affected = sqlx::query(
            "UPDATE files SET is_public = TRUE, share_token = $3 WHERE owner_id = $1 AND id = $2",
        )
        .bind(owner_id)
        .bind(id)
        .bind(share_token)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected > 0)
    }
}
