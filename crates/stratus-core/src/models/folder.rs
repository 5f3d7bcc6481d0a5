use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::file::FileResponse;

/// One ancestor entry in a folder's precomputed path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PathSegment {
    pub id: Uuid,
    pub name: String,
}

/// Folder model for organizing files hierarchically.
///
/// `path` is the ancestor trail from the root down to (but excluding) this
/// folder, computed at creation time. Descendant discovery during recursive
/// purge queries this index instead of walking `parent_id` links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub path: Vec<PathSegment>,
    pub is_trash: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(feature = "sqlx")]
impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for Folder {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;

        let path: sqlx::types::Json<Vec<PathSegment>> = row.try_get("path")?;
        Ok(Folder {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            name: row.try_get("name")?,
            parent_id: row.try_get("parent_id")?,
            path: path.0,
            is_trash: row.try_get("is_trash")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl Folder {
    /// The path a direct child of this folder inherits: this folder's own
    /// ancestors plus this folder itself.
    pub fn child_path(&self) -> Vec<PathSegment> {
        let mut path = self.path.clone();
        path.push(PathSegment {
            id: self.id,
            name: self.name.clone(),
        });
        path
    }

    /// Whether `folder_id` appears in this folder's ancestor trail.
    pub fn has_ancestor(&self, folder_id: Uuid) -> bool {
        self.path.iter().any(|seg| seg.id == folder_id)
    }
}

/// Request DTO for creating a new folder
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateFolderRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Folder name must be between 1 and 255 characters"
    ))]
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

/// Folder metadata as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FolderResponse {
    pub id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub path: Vec<PathSegment>,
    pub is_trash: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Folder> for FolderResponse {
    fn from(folder: Folder) -> Self {
        FolderResponse {
            id: folder.id,
            name: folder.name,
            parent_id: folder.parent_id,
            path: folder.path,
            is_trash: folder.is_trash,
            created_at: folder.created_at,
            updated_at: folder.updated_at,
        }
    }
}

/// Contents of one folder level: subfolders and files, plus the folder
/// itself for breadcrumb rendering (None at root).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FolderContentsResponse {
    pub folders: Vec<FolderResponse>,
    pub files: Vec<FileResponse>,
    pub current_folder: Option<FolderResponse>,
}

/// Response after creating a folder.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateFolderResponse {
    pub success: bool,
    pub folder: FolderResponse,
}

/// Outcome of a recursive folder purge. Residual files are the ones whose
/// permanent delete failed; their records remain for a retry.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FolderPurgeResponse {
    pub success: bool,
    pub folders_removed: u64,
    pub files_removed: usize,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub residual_file_ids: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(name: &str, path: Vec<PathSegment>) -> Folder {
        Folder {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: name.to_string(),
            parent_id: None,
            path,
            is_trash: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_child_path_appends_self() {
        let root = folder("root", Vec::new());
        let child_path = root.child_path();
        assert_eq!(child_path.len(), 1);
        assert_eq!(child_path[0].id, root.id);
        assert_eq!(child_path[0].name, "root");
    }

    #[test]
    fn test_has_ancestor() {
        let root = folder("root", Vec::new());
        let child = folder("child", root.child_path());
        let grandchild = folder("grandchild", child.child_path());

        assert!(child.has_ancestor(root.id));
        assert!(grandchild.has_ancestor(root.id));
        assert!(grandchild.has_ancestor(child.id));
        assert!(!root.has_ancestor(child.id));
    }
}
