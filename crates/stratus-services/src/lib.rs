//! Stratus Services Library
//!
//! Server-side business logic bridging the HTTP layer to repositories and
//! storage providers: upload session issuance and finalization, the
//! provider/local consistency policy for delete, trash, restore and
//! rename, recursive folder purge with per-file outcome aggregation,
//! share-link publication, and fire-and-forget notifications.

pub mod files;
pub mod folders;
pub mod notifier;
pub mod shares;
pub mod uploads;

pub use files::FileService;
pub use folders::{FolderService, PurgeOutcome};
pub use notifier::Notifier;
pub use shares::ShareService;
pub use uploads::UploadService;
