use futures::future::join_all;
use stratus_core::models::{Folder, FolderContentsResponse, FolderResponse};
use stratus_core::AppError;
use stratus_db::{FileRepository, FolderRepository};
use uuid::Uuid;

use crate::files::FileService;

/// Result of a recursive folder purge. Per-file outcomes are aggregated
/// so partial failure is visible to the caller instead of vanishing into
/// fire-and-forget deletes: residual files keep their records (their
/// permanent delete failed and can be retried), while the folder
/// documents are removed regardless.
#[derive(Debug)]
pub struct PurgeOutcome {
    pub folders_removed: u64,
    pub files_removed: usize,
    /// Files whose permanent delete failed, with the failure message.
    pub residual_files: Vec<(Uuid, String)>,
}

impl PurgeOutcome {
    pub fn is_clean(&self) -> bool {
        self.residual_files.is_empty()
    }
}

/// Folder hierarchy operations. Folders are virtual (DB only); the
/// provider is involved only through the files a purge removes.
#[derive(Clone)]
pub struct FolderService {
    folders: FolderRepository,
    files: FileRepository,
    file_service: FileService,
}

impl FolderService {
    pub fn new(
        folders: FolderRepository,
        files: FileRepository,
        file_service: FileService,
    ) -> Self {
        Self {
            folders,
            files,
            file_service,
        }
    }

    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn create_folder(
        &self,
        user_id: Uuid,
        name: &str,
        parent_id: Option<Uuid>,
    ) -> Result<Folder, AppError> {
        self.folders.create_folder(user_id, name, parent_id).await
    }

    /// One folder level: subfolders, files, and the folder itself for
    /// breadcrumbs (None at root).
    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn contents(
        &self,
        user_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> Result<FolderContentsResponse, AppError> {
        let current_folder = match folder_id {
            Some(id) => Some(
                self.folders
                    .get_folder(user_id, id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Folder not found".to_string()))?,
            ),
            None => None,
        };

        let folders = self.folders.list_folders(user_id, folder_id, false).await?;
        let files = self.files.list_files(user_id, folder_id, false).await?;

        Ok(FolderContentsResponse {
            folders: folders.into_iter().map(FolderResponse::from).collect(),
            files: files.into_iter().map(Into::into).collect(),
            current_folder: current_folder.map(FolderResponse::from),
        })
    }

    #[tracing::instrument(skip(self), fields(user_id = %user_id, folder_id = %folder_id))]
    pub async fn delete_folder(&self, user_id: Uuid, folder_id: Uuid) -> Result<(), AppError> {
        let updated = self.folders.set_trash(user_id, folder_id, true).await?;
        if !updated {
            return Err(AppError::NotFound("Folder not found".to_string()));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(user_id = %user_id, folder_id = %folder_id))]
    pub async fn restore_folder(&self, user_id: Uuid, folder_id: Uuid) -> Result<(), AppError> {
        let updated = self.folders.set_trash(user_id, folder_id, false).await?;
        if !updated {
            return Err(AppError::NotFound("Folder not found".to_string()));
        }
        Ok(())
    }

    /// Permanently delete a folder subtree.
    ///
    /// Descendants are discovered through the precomputed ancestor-path
    /// index, every contained file goes through the single-file permanent
    /// delete (so provider cleanup and usage accounting apply uniformly),
    /// and the folder documents are bulk-removed afterwards. File
    /// deletions run concurrently and their outcomes are collected.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, folder_id = %folder_id))]
    pub async fn delete_folder_permanently(
        &self,
        user_id: Uuid,
        folder_id: Uuid,
    ) -> Result<PurgeOutcome, AppError> {
        let folder = self
            .folders
            .get_folder(user_id, folder_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Folder not found".to_string()))?;

        let descendants = self.folders.find_descendants(user_id, folder_id).await?;

        let mut all_folder_ids: Vec<Uuid> = Vec::with_capacity(descendants.len() + 1);
        all_folder_ids.push(folder.id);
        all_folder_ids.extend(descendants.iter().map(|f| f.id));

        let files = self.files.list_in_folders(user_id, &all_folder_ids).await?;

        let deletions = files.iter().map(|file| {
            let file_id = file.id;
            let service = self.file_service.clone();
            async move {
                (
                    file_id,
                    service.delete_file_permanently(user_id, file_id).await,
                )
            }
        });

        let mut files_removed = 0;
        let mut residual_files = Vec::new();
        for (file_id, result) in join_all(deletions).await {
            match result {
                Ok(()) => files_removed += 1,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        file_id = %file_id,
                        "File deletion failed during folder purge"
                    );
                    residual_files.push((file_id, e.to_string()));
                }
            }
        }

        let folders_removed = self.folders.delete_many(user_id, &all_folder_ids).await?;

        tracing::info!(
            user_id = %user_id,
            folder_id = %folder_id,
            folders_removed,
            files_removed,
            residual = residual_files.len(),
            "Folder subtree purged"
        );

        Ok(PurgeOutcome {
            folders_removed,
            files_removed,
            residual_files,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purge_outcome_clean() {
        let outcome = PurgeOutcome {
            folders_removed: 2,
            files_removed: 3,
            residual_files: Vec::new(),
        };
        assert!(outcome.is_clean());

        let outcome = PurgeOutcome {
            folders_removed: 2,
            files_removed: 2,
            residual_files: vec![(Uuid::new_v4(), "Provider error".to_string())],
        };
        assert!(!outcome.is_clean());
    }
}
