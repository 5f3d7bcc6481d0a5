use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::file::FileResponse;

/// Request to open a resumable upload session with the provider.
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
pub struct UploadSessionRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "File name must be between 1 and 255 characters"
    ))]
    pub file_name: String,
    /// MIME type; defaults to application/octet-stream when absent.
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Declared size in bytes (a hint for the provider, not authoritative).
    pub file_size: u64,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    /// The page origin, forwarded so the provider scopes CORS to it.
    #[serde(default)]
    pub origin: Option<String>,
}

impl UploadSessionRequest {
    pub fn mime_type_or_default(&self) -> &str {
        self.mime_type
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or("application/octet-stream")
    }
}

/// Response carrying the provider-issued session URL.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadSessionResponse {
    pub success: bool,
    pub upload_url: String,
}

/// File metadata from the provider's upload-completion response body.
///
/// The provider reports the canonical byte size as a JSON string; the
/// degraded client-side fallback reports it as a number. Both are accepted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderFileMeta {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_size")]
    pub size: Option<u64>,
    #[serde(default)]
    pub web_view_link: Option<String>,
    #[serde(default)]
    pub web_content_link: Option<String>,
}

fn deserialize_size<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SizeRepr {
        Str(String),
        Num(u64),
    }

    let value: Option<SizeRepr> = Option::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(SizeRepr::Num(n)) => Ok(Some(n)),
        Some(SizeRepr::Str(s)) => s
            .parse::<u64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid size: {}", s))),
    }
}

/// Request to persist a completed direct-to-provider upload.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct FinalizeUploadRequest {
    pub file: ProviderFileMeta,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

/// Response after a successful finalize.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FinalizeUploadResponse {
    pub success: bool,
    pub file: FileResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_meta_accepts_string_size() {
        let meta: ProviderFileMeta = serde_json::from_str(
            r#"{"id":"abc123","name":"notes.txt","mimeType":"text/plain","size":"10240","webViewLink":"https://x/view","webContentLink":"https://x/dl"}"#,
        )
        .unwrap();
        assert_eq!(meta.id, "abc123");
        assert_eq!(meta.size, Some(10_240));
        assert_eq!(meta.mime_type.as_deref(), Some("text/plain"));
        assert_eq!(meta.web_view_link.as_deref(), Some("https://x/view"));
    }

    #[test]
    fn test_provider_meta_accepts_numeric_size() {
        let meta: ProviderFileMeta =
            serde_json::from_str(r#"{"id":"unknown","size":10240}"#).unwrap();
        assert_eq!(meta.size, Some(10_240));
        assert!(meta.name.is_none());
    }

    #[test]
    fn test_provider_meta_rejects_garbage_size() {
        let result =
            serde_json::from_str::<ProviderFileMeta>(r#"{"id":"abc","size":"not-a-number"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_mime_type_default() {
        let req = UploadSessionRequest {
            file_name: "a.bin".to_string(),
            mime_type: None,
            file_size: 1,
            parent_id: None,
            origin: None,
        };
        assert_eq!(req.mime_type_or_default(), "application/octet-stream");

        let req = UploadSessionRequest {
            mime_type: Some(String::new()),
            ..req
        };
        assert_eq!(req.mime_type_or_default(), "application/octet-stream");
    }
}
