//! Application state
//!
//! One `AppState` behind an `Arc`, holding the config, the pool, the
//! repositories handlers read directly, and the services that carry the
//! multi-step flows.

use sqlx::PgPool;
use stratus_core::Config;
use stratus_db::{NotificationRepository, UserRepository};
use stratus_services::{FileService, FolderService, ShareService, UploadService};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pool: PgPool,
    pub users: UserRepository,
    pub notifications: NotificationRepository,
    pub uploads: UploadService,
    pub files: FileService,
    pub folders: FolderService,
    pub shares: ShareService,
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
