//! HTTP client for the Stratus API.
//!
//! A minimal client with Bearer-token auth and the domain calls the
//! upload orchestrator drives. The raw `reqwest` client is exposed for
//! the direct-to-provider transfer, which goes to the session URL rather
//! than the API.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use stratus_core::models::{
    FinalizeUploadRequest, FinalizeUploadResponse, ProviderFileMeta, StorageSummary,
    UploadSessionRequest, UploadSessionResponse,
};
use uuid::Uuid;

const API_PREFIX: &str = "/api/v1";

/// HTTP client for the Stratus API with Bearer-token auth.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    pub fn new(base_url: String, token: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Create client from environment: STRATUS_API_URL and STRATUS_TOKEN.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("STRATUS_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        let token =
            std::env::var("STRATUS_TOKEN").context("Missing session token. Set STRATUS_TOKEN")?;

        Self::new(base_url, token)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    async fn handle_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "API request failed with status {}: {}",
                status,
                error_text
            ));
        }

        response
            .json()
            .await
            .context("Failed to parse response as JSON")
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .client
            .post(self.build_url(path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        Self::handle_json(response).await
    }

    /// GET request and deserialize response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .client
            .get(self.build_url(path))
            .bearer_auth(&self.token)
            .send()
            .await
            .context("Failed to send request")?;

        Self::handle_json(response).await
    }

    /// Ask the server for a resumable session URL.
    pub async fn request_upload_session(
        &self,
        request: &UploadSessionRequest,
    ) -> Result<UploadSessionResponse> {
        self.post_json("/uploads/session", request).await
    }

    /// Report a completed direct upload for persistence.
    pub async fn finalize_upload(
        &self,
        file: ProviderFileMeta,
        parent_id: Option<Uuid>,
    ) -> Result<FinalizeUploadResponse> {
        self.post_json("/uploads/finalize", &FinalizeUploadRequest { file, parent_id })
            .await
    }

    /// Server-proxied small-file upload: the raw file goes to the server
    /// in one multipart request.
    pub async fn upload_via_server(
        &self,
        file_name: &str,
        mime_type: &str,
        data: Vec<u8>,
        parent_id: Option<Uuid>,
    ) -> Result<FinalizeUploadResponse> {
        let part = reqwest::multipart::Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(mime_type)
            .context("Invalid MIME type")?;

        let mut form = reqwest::multipart::Form::new().part("file", part);
        if let Some(parent) = parent_id {
            form = form.text("parent_id", parent.to_string());
        }

        let response = self
            .client
            .post(self.build_url("/files"))
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await
            .context("Failed to send request")?;

        Self::handle_json(response).await
    }

    /// Usage and quota for the session user.
    pub async fn storage_summary(&self) -> Result<StorageSummary> {
        self.get("/me/storage").await
    }

    /// Raw client for the direct-to-provider transfer (absolute session
    /// URL, no API auth).
    pub fn http(&self) -> &Client {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_strips_trailing_slash() {
        let client = ApiClient::new("http://localhost:3000/".to_string(), "t".to_string()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(
            client.build_url("/uploads/session"),
            "http://localhost:3000/api/v1/uploads/session"
        );
    }
}
