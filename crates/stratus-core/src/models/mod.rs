pub mod file;
pub mod folder;
pub mod notification;
pub mod upload;
pub mod user;

pub use file::{size_kb_from_bytes, FileActionResponse, FileRecord, FileResponse, RenameFileRequest, ShareFileResponse};
pub use folder::{
    CreateFolderRequest, CreateFolderResponse, Folder, FolderContentsResponse,
    FolderPurgeResponse, FolderResponse, PathSegment,
};
pub use notification::{Notification, NotificationKind, NotificationResponse};
pub use upload::{
    FinalizeUploadRequest, FinalizeUploadResponse, ProviderFileMeta, UploadSessionRequest,
    UploadSessionResponse,
};
pub use user::{StorageSummary, User};
