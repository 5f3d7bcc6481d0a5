//! Application initialization: database, services, routes, server.

pub mod routes;
pub mod server;

use crate::state::AppState;
use axum::Router;
use std::sync::Arc;
use stratus_core::Config;
use stratus_db::{
    connect_pool, FileRepository, FolderRepository, NotificationRepository, UserRepository,
};
use stratus_services::{FileService, FolderService, Notifier, ShareService, UploadService};

/// Connect the database, wire the services, and build the router.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, Router), anyhow::Error> {
    let pool = connect_pool(&config).await?;

    let files_repo = FileRepository::new(pool.clone());
    let folders_repo = FolderRepository::new(pool.clone());
    let users_repo = UserRepository::new(pool.clone());
    let notifications_repo = NotificationRepository::new(pool.clone());

    let notifier = Notifier::new(notifications_repo.clone());
    let file_service = FileService::new(config.clone(), files_repo.clone(), notifier.clone());

    let state = Arc::new(AppState {
        uploads: UploadService::new(config.clone(), files_repo.clone(), notifier.clone()),
        folders: FolderService::new(folders_repo, files_repo.clone(), file_service.clone()),
        shares: ShareService::new(config.clone(), files_repo, notifier),
        files: file_service,
        users: users_repo,
        notifications: notifications_repo,
        pool,
        config: config.clone(),
    });

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
