use crate::traits::{
    ByteStream, Capability, RemoteFile, StorageError, StorageProvider, StorageResult,
};
use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use std::time::Duration;
use stratus_core::constants::RESUMABLE_RESPONSE_FIELDS;
use stratus_core::{Config, ProviderKind};
use uuid::Uuid;

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Cloud drive storage provider.
///
/// Speaks the provider's HTTP API directly: a long-lived refresh token is
/// exchanged for a short-lived access token on every call, so an expired
/// token never reaches the provider. Resumable sessions are created with a
/// raw signed request because the session URL only surfaces in the
/// `Location` response header.
#[derive(Clone)]
pub struct CloudDriveProvider {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    refresh_token: String,
    root_folder_id: Option<String>,
    api_base: String,
    upload_base: String,
    token_url: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    web_view_link: Option<String>,
    #[serde(default)]
    web_content_link: Option<String>,
}

impl CloudDriveProvider {
    pub fn from_config(config: &Config) -> StorageResult<Self> {
        let (client_id, client_secret, refresh_token) = match (
            config.drive_client_id.clone(),
            config.drive_client_secret.clone(),
            config.drive_refresh_token.clone(),
        ) {
            (Some(id), Some(secret), Some(token)) => (id, secret, token),
            _ => {
                return Err(StorageError::ConfigError(
                    "Cloud drive credentials not configured (DRIVE_CLIENT_ID, DRIVE_CLIENT_SECRET, DRIVE_REFRESH_TOKEN)".to_string(),
                ))
            }
        };

        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(CloudDriveProvider {
            http,
            client_id,
            client_secret,
            refresh_token,
            root_folder_id: config.drive_root_folder_id.clone(),
            api_base: config.drive_api_base.trim_end_matches('/').to_string(),
            upload_base: config.drive_upload_base.trim_end_matches('/').to_string(),
            token_url: config.drive_token_url.clone(),
        })
    }

    /// Exchange the refresh token for a short-lived access token.
    /// Done per call - no cross-call cache.
    async fn access_token(&self) -> StorageResult<String> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", self.refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| StorageError::Unauthorized(format!("Token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Unauthorized(format!(
                "Token refresh rejected: {} {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| StorageError::Unauthorized(format!("Invalid token response: {}", e)))?;

        Ok(token.access_token)
    }

    /// App-level folders are virtual; provider objects all live under the
    /// configured root folder.
    fn parents(&self) -> Vec<String> {
        self.root_folder_id.clone().into_iter().collect()
    }

    fn file_url(&self, external_id: &str) -> String {
        format!("{}/files/{}", self.api_base, external_id)
    }

    /// PATCH file metadata (trash flag, name).
    async fn patch_file(
        &self,
        external_id: &str,
        body: serde_json::Value,
    ) -> StorageResult<bool> {
        let token = self.access_token().await?;
        let response = self
            .http
            .patch(self.file_url(external_id))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(StorageError::BackendError(format!(
                "Metadata update rejected: {} {}",
                status, text
            )));
        }

        Ok(true)
    }
}

#[async_trait]
impl StorageProvider for CloudDriveProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::CloudDrive
    }

    fn supports(&self, _cap: Capability) -> bool {
        true
    }

    async fn upload(
        &self,
        name: &str,
        content_type: &str,
        data: Vec<u8>,
        _parent: Option<&str>,
    ) -> StorageResult<RemoteFile> {
        let token = self.access_token().await?;
        let size = data.len();
        let start = std::time::Instant::now();

        // Single multipart/related create-with-content call. The whole
        // payload is buffered; acceptable for the small-file path only.
        let metadata = serde_json::json!({
            "name": name,
            "mimeType": content_type,
            "parents": self.parents(),
        });

        let boundary = format!("stratus-{}", Uuid::new_v4().simple());
        let mut body = Vec::with_capacity(size + 512);
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n",
                boundary
            )
            .as_bytes(),
        );
        body.extend_from_slice(metadata.to_string().as_bytes());
        body.extend_from_slice(
            format!("\r\n--{}\r\nContent-Type: {}\r\n\r\n", boundary, content_type).as_bytes(),
        );
        body.extend_from_slice(&data);
        body.extend_from_slice(format!("\r\n--{}--", boundary).as_bytes());

        let response = self
            .http
            .post(format!("{}/files", self.upload_base))
            .query(&[
                ("uploadType", "multipart"),
                ("fields", "id,webViewLink,webContentLink"),
            ])
            .bearer_auth(&token)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(StorageError::UploadFailed(format!(
                "{} {}",
                status, text
            )));
        }

        let file: DriveFile = response
            .json()
            .await
            .map_err(|e| StorageError::UploadFailed(format!("Invalid response body: {}", e)))?;

        let external_id = match file.id {
            Some(id) if !id.is_empty() => id,
            _ => {
                return Err(StorageError::UploadFailed(
                    "Provider returned no file identifier".to_string(),
                ))
            }
        };

        tracing::info!(
            name = %name,
            external_id = %external_id,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Cloud drive upload successful"
        );

        Ok(RemoteFile {
            external_id,
            external_url: file.web_view_link,
            download_url: file.web_content_link,
        })
    }

    async fn resumable_upload_url(
        &self,
        name: &str,
        content_type: &str,
        size_hint: Option<u64>,
        _parent: Option<&str>,
        origin: Option<&str>,
    ) -> StorageResult<String> {
        let token = self.access_token().await?;

        let metadata = serde_json::json!({
            "name": name,
            "mimeType": content_type,
            "parents": self.parents(),
        });

        let mut request = self
            .http
            .post(format!("{}/files", self.upload_base))
            .query(&[
                ("uploadType", "resumable"),
                ("fields", RESUMABLE_RESPONSE_FIELDS),
            ])
            .bearer_auth(&token)
            .header(reqwest::header::CONTENT_TYPE, "application/json; charset=UTF-8")
            .header("X-Upload-Content-Type", content_type);

        if let Some(size) = size_hint {
            request = request.header("X-Upload-Content-Length", size);
        }
        // Forward the page origin so the provider scopes CORS on the
        // session URL to the caller's page.
        if let Some(origin) = origin {
            request = request.header(reqwest::header::ORIGIN, origin);
        }

        let response = request
            .json(&metadata)
            .send()
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::SessionRejected {
                status: status.as_u16(),
                body,
            });
        }

        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        match location {
            Some(url) if !url.is_empty() => {
                tracing::info!(name = %name, "Resumable upload session created");
                Ok(url)
            }
            _ => Err(StorageError::SessionRejected {
                status: status.as_u16(),
                body: "No upload session URL in provider response".to_string(),
            }),
        }
    }

    /// Deleting an already-absent identifier is treated as success.
    async fn delete(&self, external_id: &str) -> StorageResult<bool> {
        let token = self.access_token().await?;
        let response = self
            .http
            .delete(self.file_url(external_id))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| StorageError::DeleteFailed(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            tracing::info!(external_id = %external_id, "Delete of absent file treated as success");
            return Ok(true);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(StorageError::DeleteFailed(format!("{} {}", status, text)));
        }

        tracing::info!(external_id = %external_id, "Cloud drive delete successful");
        Ok(true)
    }

    async fn trash(&self, external_id: &str) -> StorageResult<bool> {
        self.patch_file(external_id, serde_json::json!({ "trashed": true }))
            .await
    }

    async fn restore(&self, external_id: &str) -> StorageResult<bool> {
        self.patch_file(external_id, serde_json::json!({ "trashed": false }))
            .await
    }

    async fn rename(&self, external_id: &str, new_name: &str) -> StorageResult<bool> {
        self.patch_file(external_id, serde_json::json!({ "name": new_name }))
            .await
    }

    async fn make_public(&self, external_id: &str) -> StorageResult<Option<String>> {
        let token = match self.access_token().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, external_id = %external_id, "make_public auth failed");
                return Ok(None);
            }
        };

        // Grant anyone/reader, then re-fetch metadata so the links are
        // populated. Any failure degrades to None; sharing stays local-only.
        let permission = self
            .http
            .post(format!("{}/permissions", self.file_url(external_id)))
            .bearer_auth(&token)
            .json(&serde_json::json!({ "role": "reader", "type": "anyone" }))
            .send()
            .await;

        match permission {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => {
                tracing::warn!(
                    status = %resp.status(),
                    external_id = %external_id,
                    "make_public permission rejected"
                );
                return Ok(None);
            }
            Err(e) => {
                tracing::warn!(error = %e, external_id = %external_id, "make_public request failed");
                return Ok(None);
            }
        }

        let file = self
            .http
            .get(self.file_url(external_id))
            .query(&[("fields", "webViewLink,webContentLink")])
            .bearer_auth(&token)
            .send()
            .await
            .ok();

        let view_link = match file {
            Some(resp) if resp.status().is_success() => resp
                .json::<DriveFile>()
                .await
                .ok()
                .and_then(|f| f.web_view_link),
            _ => None,
        };

        Ok(view_link)
    }

    async fn download_url(&self, external_id: &str) -> StorageResult<Option<String>> {
        // A bare download link requires the file to be readable by the
        // recipient, so this publishes first.
        self.make_public(external_id).await
    }

    async fn download_stream(&self, external_id: &str) -> StorageResult<ByteStream> {
        let token = self.access_token().await?;
        let response = self
            .http
            .get(self.file_url(external_id))
            .query(&[("alt", "media")])
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound(external_id.to_string()));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(StorageError::DownloadFailed(format!("{} {}", status, text)));
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| StorageError::DownloadFailed(e.to_string())));

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_requires_credentials() {
        let config = Config::for_tests();
        let result = CloudDriveProvider::from_config(&config);
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }

    #[test]
    fn test_parents_uses_configured_root() {
        let mut config = Config::for_tests();
        config.drive_client_id = Some("id".to_string());
        config.drive_client_secret = Some("secret".to_string());
        config.drive_refresh_token = Some("refresh".to_string());
        config.drive_root_folder_id = Some("root123".to_string());

        let provider = CloudDriveProvider::from_config(&config).unwrap();
        assert_eq!(provider.parents(), vec!["root123".to_string()]);
        assert!(provider.supports(Capability::ResumableSession));
        assert!(provider.supports(Capability::Trash));
    }

    #[test]
    fn test_file_url_shape() {
        let mut config = Config::for_tests();
        config.drive_client_id = Some("id".to_string());
        config.drive_client_secret = Some("secret".to_string());
        config.drive_refresh_token = Some("refresh".to_string());
        config.drive_api_base = "https://api.example.com/drive/v3/".to_string();

        let provider = CloudDriveProvider::from_config(&config).unwrap();
        assert_eq!(
            provider.file_url("abc123"),
            "https://api.example.com/drive/v3/files/abc123"
        );
    }
}
