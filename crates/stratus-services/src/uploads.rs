use stratus_core::models::{
    size_kb_from_bytes, FileRecord, NotificationKind, ProviderFileMeta, UploadSessionRequest,
};
use stratus_core::{AppError, Config, ProviderKind};
use stratus_db::FileRepository;
use stratus_storage::{provider_for, Capability};
use uuid::Uuid;

use crate::notifier::Notifier;

/// Upload session issuance and finalization.
///
/// The session step authorizes a client-initiated direct-to-provider
/// transfer; finalize persists the result afterwards. Nothing is written
/// locally until the provider has confirmed the upload.
#[derive(Clone)]
pub struct UploadService {
    config: Config,
    files: FileRepository,
    notifier: Notifier,
}

impl UploadService {
    pub fn new(config: Config, files: FileRepository, notifier: Notifier) -> Self {
        Self {
            config,
            files,
            notifier,
        }
    }

    fn default_provider_kind(&self) -> ProviderKind {
        self.config.storage_provider.unwrap_or(ProviderKind::LocalMock)
    }

    /// Obtain a provider-issued resumable session URL for a direct upload.
    /// Nothing is persisted here; a rejected session leaves no trace.
    #[tracing::instrument(skip(self, request), fields(user_id = %user_id, file_name = %request.file_name))]
    pub async fn request_upload_session(
        &self,
        user_id: Uuid,
        request: &UploadSessionRequest,
    ) -> Result<String, AppError> {
        let provider = provider_for(None, &self.config)?;

        if !provider.supports(Capability::ResumableSession) {
            return Err(AppError::Provider(format!(
                "Provider {} does not support resumable uploads",
                provider.kind()
            )));
        }

        let parent = request.parent_id.map(|id| id.to_string());
        let upload_url = provider
            .resumable_upload_url(
                &request.file_name,
                request.mime_type_or_default(),
                Some(request.file_size),
                parent.as_deref(),
                request.origin.as_deref(),
            )
            .await?;

        tracing::info!(user_id = %user_id, "Upload session issued");

        Ok(upload_url)
    }

    /// Persist a completed direct-to-provider upload: create the file
    /// record and increment the owner's usage counter by the
    /// provider-reported byte size, atomically. Rejects a missing external
    /// identifier before any side effect.
    #[tracing::instrument(skip(self, meta), fields(user_id = %user_id))]
    pub async fn finalize(
        &self,
        user_id: Uuid,
        meta: &ProviderFileMeta,
        parent_id: Option<Uuid>,
    ) -> Result<FileRecord, AppError> {
        if meta.id.is_empty() {
            return Err(AppError::InvalidInput(
                "Upload result is missing a file identifier".to_string(),
            ));
        }

        // Counter uses the provider-reported size, not the declared one,
        // so the quota tracks what the provider actually stored.
        let size_bytes = meta.size.unwrap_or(0);
        let name = meta.name.as_deref().unwrap_or("uploaded_file");
        let mime_type = meta
            .mime_type
            .as_deref()
            .unwrap_or("application/octet-stream");

        let record = self
            .files
            .create_with_usage(
                user_id,
                parent_id,
                name,
                mime_type,
                size_kb_from_bytes(size_bytes),
                self.default_provider_kind(),
                &meta.id,
                meta.web_view_link.as_deref(),
                meta.web_content_link.as_deref(),
                size_bytes as i64,
            )
            .await?;

        tracing::info!(
            user_id = %user_id,
            file_id = %record.id,
            external_id = %record.external_id,
            size_bytes,
            "Upload finalized"
        );

        self.notifier.notify(
            user_id,
            NotificationKind::Upload,
            "File uploaded",
            format!("{} was uploaded to your drive", record.name),
        );

        Ok(record)
    }

    /// Server-proxied small-file path: the server receives the raw bytes
    /// and performs the provider upload itself. Callers run files
    /// sequentially on this path.
    #[tracing::instrument(skip(self, data), fields(user_id = %user_id, file_name = %file_name, size_bytes = data.len()))]
    pub async fn upload_via_server(
        &self,
        user_id: Uuid,
        file_name: &str,
        mime_type: &str,
        data: Vec<u8>,
        parent_id: Option<Uuid>,
    ) -> Result<FileRecord, AppError> {
        if data.is_empty() {
            return Err(AppError::InvalidInput("No file provided".to_string()));
        }

        let provider = provider_for(None, &self.config)?;
        let size_bytes = data.len() as u64;

        let parent = parent_id.map(|id| id.to_string());
        let remote = provider
            .upload(file_name, mime_type, data, parent.as_deref())
            .await?;

        let record = self
            .files
            .create_with_usage(
                user_id,
                parent_id,
                file_name,
                mime_type,
                size_kb_from_bytes(size_bytes),
                provider.kind(),
                &remote.external_id,
                remote.external_url.as_deref(),
                remote.download_url.as_deref(),
                size_bytes as i64,
            )
            .await?;

        self.notifier.notify(
            user_id,
            NotificationKind::Upload,
            "File uploaded",
            format!("{} was uploaded to your drive", record.name),
        );

        Ok(record)
    }
}
