use std::sync::Arc;

use stratus_core::models::{FileActionResponse, FileRecord, NotificationKind};
use stratus_core::{AppError, Config};
use stratus_db::FileRepository;
use stratus_storage::{provider_for, ByteStream, Capability, StorageProvider};
use uuid::Uuid;

use crate::notifier::Notifier;

/// Warning attached when a tolerated provider call fails during soft delete.
pub const CLOUD_SYNC_WARNING: &str = "Cloud sync failed";

/// File lifecycle operations and the provider/local consistency policy.
///
/// Policy table:
/// - soft delete and rename tolerate a provider failure (local state still
///   changes; soft delete reports a warning),
/// - restore and permanent delete propagate a provider failure and leave
///   local state untouched.
#[derive(Clone)]
pub struct FileService {
    config: Config,
    files: FileRepository,
    notifier: Notifier,
}

impl FileService {
    pub fn new(config: Config, files: FileRepository, notifier: Notifier) -> Self {
        Self {
            config,
            files,
            notifier,
        }
    }

    async fn get_existing(&self, user_id: Uuid, file_id: Uuid) -> Result<FileRecord, AppError> {
        self.files
            .get_file(user_id, file_id)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))
    }

    fn provider_for_record(
        &self,
        record: &FileRecord,
    ) -> Result<Arc<dyn StorageProvider>, AppError> {
        Ok(provider_for(
            Some(&record.provider.to_string()),
            &self.config,
        )?)
    }

    /// Soft delete. The provider `trash` is attempted when supported, but
    /// the local flag always flips: the user's intent wins over a
    /// transient remote failure, which degrades to a warning.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, file_id = %file_id))]
    pub async fn delete_file(
        &self,
        user_id: Uuid,
        file_id: Uuid,
    ) -> Result<FileActionResponse, AppError> {
        let record = self.get_existing(user_id, file_id).await?;
        let provider = self.provider_for_record(&record)?;

        let mut warning = None;
        if provider.supports(Capability::Trash) && !record.external_id.is_empty() {
            if let Err(e) = provider.trash(&record.external_id).await {
                tracing::warn!(
                    error = %e,
                    file_id = %file_id,
                    external_id = %record.external_id,
                    "Provider trash failed; marking trashed locally anyway"
                );
                warning = Some(CLOUD_SYNC_WARNING);
            }
        }

        self.files.set_trash(user_id, file_id, true).await?;

        self.notifier.notify(
            user_id,
            NotificationKind::Trash,
            "File moved to trash",
            format!("{} was moved to trash", record.name),
        );

        Ok(match warning {
            Some(w) => FileActionResponse::ok_with_warning(w),
            None => FileActionResponse::ok(),
        })
    }

    /// Restore from trash. Unlike soft delete, a provider failure here is
    /// an overall failure and the local flag stays set.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, file_id = %file_id))]
    pub async fn restore_file(&self, user_id: Uuid, file_id: Uuid) -> Result<(), AppError> {
        let record = self.get_existing(user_id, file_id).await?;
        let provider = self.provider_for_record(&record)?;

        if provider.supports(Capability::Restore) && !record.external_id.is_empty() {
            provider.restore(&record.external_id).await.map_err(|e| {
                tracing::warn!(error = %e, file_id = %file_id, "Provider restore failed");
                AppError::Provider("Restore failed".to_string())
            })?;
        }

        self.files.set_trash(user_id, file_id, false).await?;

        self.notifier.notify(
            user_id,
            NotificationKind::Restore,
            "File restored",
            format!("{} was restored from trash", record.name),
        );

        Ok(())
    }

    /// Permanent delete. The provider delete runs first; if it fails the
    /// record is preserved, so a file still occupying provider storage is
    /// never silently forgotten. On success the record is removed and the
    /// usage counter decremented in one transaction.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, file_id = %file_id))]
    pub async fn delete_file_permanently(
        &self,
        user_id: Uuid,
        file_id: Uuid,
    ) -> Result<(), AppError> {
        let record = self.get_existing(user_id, file_id).await?;
        let provider = self.provider_for_record(&record)?;

        if !record.external_id.is_empty() {
            provider.delete(&record.external_id).await?;
        }

        self.files
            .delete_with_usage(user_id, file_id, record.size_kb)
            .await?;

        tracing::info!(
            user_id = %user_id,
            file_id = %file_id,
            size_kb = record.size_kb,
            "File permanently deleted"
        );

        self.notifier.notify(
            user_id,
            NotificationKind::Delete,
            "File deleted",
            format!("{} was permanently deleted", record.name),
        );

        Ok(())
    }

    /// Rename. A provider-side failure is logged but never blocks the
    /// local rename.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, file_id = %file_id))]
    pub async fn rename_file(
        &self,
        user_id: Uuid,
        file_id: Uuid,
        new_name: &str,
    ) -> Result<(), AppError> {
        let record = self.get_existing(user_id, file_id).await?;
        let provider = self.provider_for_record(&record)?;

        if provider.supports(Capability::Rename) && !record.external_id.is_empty() {
            match provider.rename(&record.external_id, new_name).await {
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        file_id = %file_id,
                        "Cloud rename failed, proceeding with local rename"
                    );
                }
            }
        }

        self.files.rename(user_id, file_id, new_name).await?;

        Ok(())
    }

    /// Stream the file's content from the provider without buffering.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, file_id = %file_id))]
    pub async fn download_stream(
        &self,
        user_id: Uuid,
        file_id: Uuid,
    ) -> Result<(FileRecord, ByteStream), AppError> {
        let record = self.get_existing(user_id, file_id).await?;
        let provider = self.provider_for_record(&record)?;

        if !provider.supports(Capability::DownloadStream) {
            return Err(AppError::Provider(format!(
                "Provider {} does not support streaming downloads",
                provider.kind()
            )));
        }

        let stream = provider.download_stream(&record.external_id).await?;
        Ok((record, stream))
    }
}
