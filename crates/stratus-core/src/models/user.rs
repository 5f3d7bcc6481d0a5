use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// User entity, reduced to the fields the storage core touches.
///
/// `storage_usage_bytes` is adjusted exclusively through the repository's
/// atomic increment; it is never read-modified-written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub storage_usage_bytes: i64,
    pub storage_quota_bytes: i64,
    pub created_at: DateTime<Utc>,
}

/// Usage and quota for the session user.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StorageSummary {
    pub usage_bytes: i64,
    pub quota_bytes: i64,
}

impl From<&User> for StorageSummary {
    fn from(user: &User) -> Self {
        StorageSummary {
            usage_bytes: user.storage_usage_bytes,
            quota_bytes: user.storage_quota_bytes,
        }
    }
}
