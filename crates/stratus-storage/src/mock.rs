use crate::traits::{
    ByteStream, Capability, RemoteFile, StorageError, StorageProvider, StorageResult,
};
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use stratus_core::ProviderKind;
use uuid::Uuid;

/// Mock storage provider for development without live credentials.
///
/// Simulates transfer latency and returns synthetic identifiers.
/// Deterministic success; `delete` treats an unknown identifier as success.
/// Does not implement trash, restore, make_public, or resumable sessions,
/// which exercises the callers' capability-fallback paths.
#[derive(Clone)]
pub struct MockProvider {
    latency: Duration,
}

impl MockProvider {
    pub fn new(latency_ms: u64) -> Self {
        MockProvider {
            latency: Duration::from_millis(latency_ms),
        }
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl StorageProvider for MockProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::LocalMock
    }

    fn supports(&self, cap: Capability) -> bool {
        matches!(
            cap,
            Capability::Upload
                | Capability::Delete
                | Capability::Rename
                | Capability::DownloadStream
        )
    }

    async fn upload(
        &self,
        name: &str,
        _content_type: &str,
        data: Vec<u8>,
        parent: Option<&str>,
    ) -> StorageResult<RemoteFile> {
        self.simulate_latency().await;

        let external_id = format!("mock_{}", Uuid::new_v4().simple());

        tracing::info!(
            name = %name,
            parent = ?parent,
            size_bytes = data.len(),
            external_id = %external_id,
            "Mock upload successful"
        );

        Ok(RemoteFile {
            external_id,
            external_url: Some("#mock-view".to_string()),
            download_url: Some("#mock-download".to_string()),
        })
    }

    async fn delete(&self, external_id: &str) -> StorageResult<bool> {
        self.simulate_latency().await;
        tracing::info!(external_id = %external_id, "Mock delete");
        Ok(true)
    }

    async fn rename(&self, external_id: &str, new_name: &str) -> StorageResult<bool> {
        self.simulate_latency().await;
        tracing::info!(external_id = %external_id, new_name = %new_name, "Mock rename");
        Ok(true)
    }

    async fn download_url(&self, _external_id: &str) -> StorageResult<Option<String>> {
        Ok(Some("#mock-download-url".to_string()))
    }

    async fn download_stream(&self, external_id: &str) -> StorageResult<ByteStream> {
        if external_id.is_empty() {
            return Err(StorageError::NotFound(external_id.to_string()));
        }

        let chunk = Bytes::from_static(b"Mock file content");
        let stream = futures::stream::once(async move { Ok::<_, StorageError>(chunk) });
        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn mock() -> MockProvider {
        MockProvider::new(0)
    }

    #[tokio::test]
    async fn test_mock_upload_returns_synthetic_id() {
        let result = mock()
            .upload("test.txt", "text/plain", b"data".to_vec(), None)
            .await
            .unwrap();

        assert!(result.external_id.starts_with("mock_"));
        assert_eq!(result.external_url.as_deref(), Some("#mock-view"));
        assert_eq!(result.download_url.as_deref(), Some("#mock-download"));
    }

    #[tokio::test]
    async fn test_mock_upload_ids_are_unique() {
        let provider = mock();
        let a = provider
            .upload("a.txt", "text/plain", Vec::new(), None)
            .await
            .unwrap();
        let b = provider
            .upload("b.txt", "text/plain", Vec::new(), None)
            .await
            .unwrap();
        assert_ne!(a.external_id, b.external_id);
    }

    #[tokio::test]
    async fn test_mock_delete_unknown_id_is_success() {
        assert!(mock().delete("mock_nonexistent").await.unwrap());
    }

    #[tokio::test]
    async fn test_mock_does_not_support_trash_or_sessions() {
        let provider = mock();
        assert!(!provider.supports(Capability::Trash));
        assert!(!provider.supports(Capability::Restore));
        assert!(!provider.supports(Capability::MakePublic));
        assert!(!provider.supports(Capability::ResumableSession));
        assert!(matches!(
            provider.trash("id").await,
            Err(StorageError::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn test_mock_download_stream() {
        let mut stream = mock().download_stream("mock_abc").await.unwrap();
        let mut content = Vec::new();
        while let Some(chunk) = stream.next().await {
            content.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(content, b"Mock file content");
    }
}
