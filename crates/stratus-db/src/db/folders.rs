use stratus_core::{
    models::{Folder, PathSegment},
    AppError,
};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const FOLDER_COLUMNS: &str =
    "id, owner_id, name, parent_id, path, is_trash, created_at, updated_at";

/// Repository for managing folders
#[derive(Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new folder. The ancestor path is inherited from the parent
    /// (parent's path plus the parent itself) so descendant discovery
    /// never has to walk parent links.
    #[tracing::instrument(skip(self), fields(db.table = "folders", db.operation = "insert"))]
    pub async fn create_folder(
        &self,
        owner_id: Uuid,
        name: &str,
        parent_id: Option<Uuid>,
    ) -> Result<Folder, AppError> {
        let path: Vec<PathSegment> = match parent_id {
            Some(pid) => {
                let parent = self
                    .get_folder(owner_id, pid)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Parent folder not found".to_string()))?;
                parent.child_path()
            }
            None => Vec::new(),
        };

        let duplicate_exists = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM folders WHERE owner_id = $1 AND parent_id IS NOT DISTINCT FROM $2 AND name = $3)"
        )
        .bind(owner_id)
        .bind(parent_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        if duplicate_exists {
            return Err(AppError::InvalidInput(
                "Duplicate folder name in same parent".to_string(),
            ));
        }

        let folder = sqlx::query_as::<Postgres, Folder>(&format!(
            r#"
            INSERT INTO folders (owner_id, name, parent_id, path)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            FOLDER_COLUMNS
        ))
        .bind(owner_id)
        .bind(name)
        .bind(parent_id)
        .bind(sqlx::types::Json(path))
        .fetch_one(&self.pool)
        .await?;

        Ok(folder)
    }

    /// Get folder by ID (owner-scoped)
    #[tracing::instrument(skip(self), fields(db.table = "folders", db.operation = "select", db.record_id = %id))]
    pub async fn get_folder(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Folder>, AppError> {
        let folder = sqlx::query_as::<Postgres, Folder>(&format!(
            "SELECT {} FROM folders WHERE owner_id = $1 AND id = $2",
            FOLDER_COLUMNS
        ))
        .bind(owner_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(folder)
    }

    /// List folders by owner + parent + trash flag, sorted by name.
    #[tracing::instrument(skip(self), fields(db.table = "folders", db.operation = "select"))]
    pub async fn list_folders(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        in_trash: bool,
    ) -> Result<Vec<Folder>, AppError> {
        let folders = sqlx::query_as::<Postgres, Folder>(&format!(
            "SELECT {} FROM folders \
             WHERE owner_id = $1 AND parent_id IS NOT DISTINCT FROM $2 AND is_trash = $3 \
             ORDER BY name ASC",
            FOLDER_COLUMNS
        ))
        .bind(owner_id)
        .bind(parent_id)
        .bind(in_trash)
        .fetch_all(&self.pool)
        .await?;

        Ok(folders)
    }

    /// Flip the trash flag. Folders are virtual (DB only), so there is no
    /// provider-side counterpart to this.
    #[tracing::instrument(skip(self), fields(db.table = "folders", db.operation = "update", db.record_id = %id))]
    pub async fn set_trash(
        &self,
        owner_id: Uuid,
        id: Uuid,
        is_trash: bool,
    ) -> Result<bool, AppError> {
        let rows_affected = sqlx::query(
            "UPDATE folders SET is_trash = $3, updated_at = NOW() WHERE owner_id = $1 AND id = $2",
        )
        .bind(owner_id)
        .bind(id)
        .bind(is_trash)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    /// All folders whose ancestor path contains the given folder id, i.e.
    /// the full subtree below it. Uses the GIN-indexed JSONB containment
    /// operator on the precomputed path.
    #[tracing::instrument(skip(self), fields(db.table = "folders", db.operation = "select"))]
    pub async fn find_descendants(
        &self,
        owner_id: Uuid,
        folder_id: Uuid,
    ) -> Result<Vec<Folder>, AppError> {
        let needle = serde_json::json!([{ "id": folder_id }]);

        let folders = sqlx::query_as::<Postgres, Folder>(&format!(
            "SELECT {} FROM folders WHERE owner_id = $1 AND path @> $2",
            FOLDER_COLUMNS
        ))
        .bind(owner_id)
        .bind(needle)
        .fetch_all(&self.pool)
        .await?;

        Ok(folders)
    }

    /// Bulk-remove folder documents. Returns the number removed.
    #[tracing::instrument(skip(self), fields(db.table = "folders", db.operation = "delete"))]
    pub async fn delete_many(&self, owner_id: Uuid, ids: &[Uuid]) -> Result<u64, AppError> {
        let rows_affected = sqlx::query("DELETE FROM folders WHERE owner_id = $1 AND id = ANY($2)")
            .bind(owner_id)
            .bind(ids)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}
