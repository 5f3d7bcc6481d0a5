use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::provider::ProviderKind;

/// A stored file's metadata record.
///
/// Never created until the external upload fully succeeded and returned a
/// provider-assigned identifier; `external_id` is non-empty once persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct FileRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub folder_id: Option<Uuid>,
    pub name: String,
    pub mime_type: String,
    /// Size in kilobytes, rounded from the provider-reported byte count.
    pub size_kb: i64,
    pub provider: ProviderKind,
    pub external_id: String,
    pub external_url: Option<String>,
    pub download_url: Option<String>,
    pub share_token: Option<String>,
    pub is_public: bool,
    pub is_starred: bool,
    pub is_trash: bool,
    pub created_at: DateTime<Utc>,
}

/// File metadata as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileResponse {
    pub id: Uuid,
    pub name: String,
    pub mime_type: String,
    pub size_kb: i64,
    pub folder_id: Option<Uuid>,
    pub external_url: Option<String>,
    pub download_url: Option<String>,
    pub is_public: bool,
    pub is_starred: bool,
    pub is_trash: bool,
    pub created_at: DateTime<Utc>,
}

impl From<FileRecord> for FileResponse {
    fn from(record: FileRecord) -> Self {
        FileResponse {
            id: record.id,
            name: record.name,
            mime_type: record.mime_type,
            size_kb: record.size_kb,
            folder_id: record.folder_id,
            external_url: record.external_url,
            download_url: record.download_url,
            is_public: record.is_public,
            is_starred: record.is_starred,
            is_trash: record.is_trash,
            created_at: record.created_at,
        }
    }
}

/// Request DTO for renaming a file
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RenameFileRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "File name must be between 1 and 255 characters"
    ))]
    pub name: String,
}

/// Outcome of a file mutation (soft delete, restore, rename, permanent delete).
///
/// `warning` is set when the operation succeeded locally but the provider
/// call failed (soft-delete policy, see the file service).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileActionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl FileActionResponse {
    pub fn ok() -> Self {
        FileActionResponse {
            success: true,
            warning: None,
        }
    }

    pub fn ok_with_warning(warning: impl Into<String>) -> Self {
        FileActionResponse {
            success: true,
            warning: Some(warning.into()),
        }
    }
}

/// Response after publishing a share link for a file.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShareFileResponse {
    pub success: bool,
    pub share_token: String,
    /// Provider-side public view link, when `make_public` succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_url: Option<String>,
}

/// Kilobyte size as persisted on file records: bytes / 1024, rounded to
/// the nearest whole kilobyte.
pub fn size_kb_from_bytes(bytes: u64) -> i64 {
    ((bytes as f64) / 1024.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_kb_rounding() {
        assert_eq!(size_kb_from_bytes(10_240), 10);
        assert_eq!(size_kb_from_bytes(0), 0);
        assert_eq!(size_kb_from_bytes(1536), 2); // rounds up at .5
        assert_eq!(size_kb_from_bytes(1023), 1);
        assert_eq!(size_kb_from_bytes(100), 0);
    }

    #[test]
    fn test_action_response_warning_skipped_when_absent() {
        let json = serde_json::to_value(FileActionResponse::ok()).unwrap();
        assert_eq!(json.get("success"), Some(&serde_json::Value::Bool(true)));
        assert!(json.get("warning").is_none());

        let json = serde_json::to_value(FileActionResponse::ok_with_warning("Cloud sync failed"))
            .unwrap();
        assert_eq!(
            json.get("warning").and_then(|v| v.as_str()),
            Some("Cloud sync failed")
        );
    }
}
