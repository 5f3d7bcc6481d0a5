//! Storage provider contract
//!
//! This module defines the `StorageProvider` trait that all storage
//! backends must implement, plus the capability query that lets callers
//! branch before invoking an optional operation.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::fmt;
use std::pin::Pin;
use stratus_core::ProviderKind;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Provider auth failed: {0}")]
    Unauthorized(String),

    #[error("Upload session rejected: {status} {body}")]
    SessionRejected { status: u16, body: String },

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Provider backend error: {0}")]
    BackendError(String),

    #[error("Operation not supported by this provider: {0}")]
    Unsupported(Capability),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Operations a provider may or may not implement. Callers check
/// `StorageProvider::supports` before invoking the optional ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Upload,
    ResumableSession,
    Delete,
    Trash,
    Restore,
    Rename,
    MakePublic,
    DownloadStream,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Upload => "upload",
            Capability::ResumableSession => "resumable_session",
            Capability::Delete => "delete",
            Capability::Trash => "trash",
            Capability::Restore => "restore",
            Capability::Rename => "rename",
            Capability::MakePublic => "make_public",
            Capability::DownloadStream => "download_stream",
        };
        write!(f, "{}", name)
    }
}

/// A fully-formed upload result from the provider. `external_id` is
/// guaranteed non-empty; adapters raise instead of returning a partial one.
#[derive(Debug, Clone)]
pub struct RemoteFile {
    pub external_id: String,
    pub external_url: Option<String>,
    pub download_url: Option<String>,
}

/// A lazy, finite, non-restartable byte stream from the provider.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

impl From<StorageError> for stratus_core::AppError {
    fn from(err: StorageError) -> Self {
        use stratus_core::AppError;
        match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
            StorageError::IoError(e) => AppError::Internal(format!("IO error: {}", e)),
            other => AppError::Provider(other.to_string()),
        }
    }
}

/// Storage provider contract
///
/// All backends implement this trait so the upload, delete, and trash
/// flows stay backend-agnostic. Mutating methods are awaited to
/// completion - the caller always knows the provider outcome before
/// deciding on local metadata writes.
///
/// Optional operations default to `StorageError::Unsupported`; `supports`
/// reports which ones a backend actually implements.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// The provider this adapter speaks to.
    fn kind(&self) -> ProviderKind;

    /// Capability query. Must agree with which methods are overridden.
    fn supports(&self, cap: Capability) -> bool;

    /// Upload a payload in one call (small-file path; the payload is fully
    /// buffered). Either a `RemoteFile` with a non-empty identifier is
    /// returned, or an error - never a partial result.
    async fn upload(
        &self,
        name: &str,
        content_type: &str,
        data: Vec<u8>,
        parent: Option<&str>,
    ) -> StorageResult<RemoteFile>;

    /// Obtain a provider-issued session URL the client can PUT raw bytes
    /// to directly, bypassing the application server for the transfer.
    async fn resumable_upload_url(
        &self,
        _name: &str,
        _content_type: &str,
        _size_hint: Option<u64>,
        _parent: Option<&str>,
        _origin: Option<&str>,
    ) -> StorageResult<String> {
        Err(StorageError::Unsupported(Capability::ResumableSession))
    }

    /// Delete a file at the provider. Idempotent-in-intent: adapters
    /// document whether "not found" is treated as success.
    async fn delete(&self, external_id: &str) -> StorageResult<bool>;

    /// Soft-delete toggle at the provider.
    async fn trash(&self, _external_id: &str) -> StorageResult<bool> {
        Err(StorageError::Unsupported(Capability::Trash))
    }

    /// Undo a provider-side soft delete.
    async fn restore(&self, _external_id: &str) -> StorageResult<bool> {
        Err(StorageError::Unsupported(Capability::Restore))
    }

    /// Rename the provider-side object.
    async fn rename(&self, _external_id: &str, _new_name: &str) -> StorageResult<bool> {
        Err(StorageError::Unsupported(Capability::Rename))
    }

    /// Grant anonymous read access and return the public view URL.
    /// Best-effort: implementations return `Ok(None)` on provider-side
    /// failure instead of raising.
    async fn make_public(&self, _external_id: &str) -> StorageResult<Option<String>> {
        Err(StorageError::Unsupported(Capability::MakePublic))
    }

    /// A direct download link, when the provider can produce one.
    async fn download_url(&self, external_id: &str) -> StorageResult<Option<String>>;

    /// Stream the file content without buffering it in memory.
    async fn download_stream(&self, _external_id: &str) -> StorageResult<ByteStream> {
        Err(StorageError::Unsupported(Capability::DownloadStream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BareProvider;

    #[async_trait]
    impl StorageProvider for BareProvider {
        fn kind(&self) -> ProviderKind {
            ProviderKind::LocalMock
        }

        fn supports(&self, cap: Capability) -> bool {
            matches!(cap, Capability::Upload | Capability::Delete)
        }

        async fn upload(
            &self,
            _name: &str,
            _content_type: &str,
            _data: Vec<u8>,
            _parent: Option<&str>,
        ) -> StorageResult<RemoteFile> {
            Ok(RemoteFile {
                external_id: "x".to_string(),
                external_url: None,
                download_url: None,
            })
        }

        async fn delete(&self, _external_id: &str) -> StorageResult<bool> {
            Ok(true)
        }

        async fn download_url(&self, _external_id: &str) -> StorageResult<Option<String>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_optional_operations_default_to_unsupported() {
        let provider = BareProvider;

        assert!(matches!(
            provider.trash("id").await,
            Err(StorageError::Unsupported(Capability::Trash))
        ));
        assert!(matches!(
            provider.restore("id").await,
            Err(StorageError::Unsupported(Capability::Restore))
        ));
        assert!(matches!(
            provider
                .resumable_upload_url("a", "b", None, None, None)
                .await,
            Err(StorageError::Unsupported(Capability::ResumableSession))
        ));
        assert!(!provider.supports(Capability::Trash));
        assert!(provider.supports(Capability::Upload));
    }
}
