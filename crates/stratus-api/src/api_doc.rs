//! OpenAPI document for the HTTP surface.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::uploads::request_upload_session,
        crate::handlers::uploads::finalize_upload,
        crate::handlers::uploads::upload_file,
        crate::handlers::files::delete_file,
        crate::handlers::files::restore_file,
        crate::handlers::files::delete_file_permanently,
        crate::handlers::files::rename_file,
        crate::handlers::files::download_file,
        crate::handlers::shares::share_file,
        crate::handlers::shares::shared_download,
        crate::handlers::folders::create_folder,
        crate::handlers::folders::folder_contents,
        crate::handlers::folders::delete_folder,
        crate::handlers::folders::restore_folder,
        crate::handlers::folders::delete_folder_permanently,
        crate::handlers::account::storage_summary,
        crate::handlers::account::list_notifications,
        crate::handlers::account::mark_notification_read,
    ),
    components(schemas(
        crate::error::ErrorResponse,
        crate::handlers::account::NotificationsResponse,
        stratus_core::models::UploadSessionRequest,
        stratus_core::models::UploadSessionResponse,
        stratus_core::models::ProviderFileMeta,
        stratus_core::models::FinalizeUploadRequest,
        stratus_core::models::FinalizeUploadResponse,
        stratus_core::models::FileResponse,
        stratus_core::models::FileActionResponse,
        stratus_core::models::RenameFileRequest,
        stratus_core::models::ShareFileResponse,
        stratus_core::models::CreateFolderRequest,
        stratus_core::models::CreateFolderResponse,
        stratus_core::models::FolderResponse,
        stratus_core::models::PathSegment,
        stratus_core::models::FolderContentsResponse,
        stratus_core::models::FolderPurgeResponse,
        stratus_core::models::StorageSummary,
        stratus_core::models::NotificationResponse,
        stratus_core::models::NotificationKind,
    )),
    tags(
        (name = "uploads", description = "Resumable sessions, finalize, proxied uploads"),
        (name = "files", description = "File lifecycle and downloads"),
        (name = "folders", description = "Folder hierarchy"),
        (name = "shares", description = "Public share links"),
        (name = "account", description = "Usage and notifications"),
    )
)]
pub struct ApiDoc;
