//! File lifecycle integration tests.
//!
//! These run against a live Postgres pointed at by DATABASE_URL and are
//! skipped (pass vacuously) when no database is configured, so the suite
//! stays green in environments without one.

use sqlx::PgPool;
use stratus_core::models::{ProviderFileMeta, UploadSessionRequest};
use stratus_core::{AppError, Config, ProviderKind};
use stratus_db::{FileRepository, FolderRepository, NotificationRepository};
use stratus_services::{FileService, FolderService, Notifier, ShareService, UploadService};
use uuid::Uuid;

async fn test_pool() -> Option<PgPool> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .ok()?;
    sqlx::migrate!("../stratus-db/migrations")
        .run(&pool)
        .await
        .expect("migrations failed");
    Some(pool)
}

async fn insert_user(pool: &PgPool) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (name, email) VALUES ($1, $2) RETURNING id",
    )
    .bind("Test User")
    .bind(format!("{}@example.com", Uuid::new_v4().simple()))
    .fetch_one(pool)
    .await
    .expect("insert user")
}

async fn usage_of(pool: &PgPool, user_id: Uuid) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT storage_usage_bytes FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("usage")
}

struct Services {
    uploads: UploadService,
    files: FileService,
    folders: FolderService,
    shares: ShareService,
    file_repo: FileRepository,
    folder_repo: FolderRepository,
}

fn build_services(pool: &PgPool, config: Config) -> Services {
    let file_repo = FileRepository::new(pool.clone());
    let folder_repo = FolderRepository::new(pool.clone());
    let notifier = Notifier::new(NotificationRepository::new(pool.clone()));
    let files = FileService::new(config.clone(), file_repo.clone(), notifier.clone());
    Services {
        uploads: UploadService::new(config.clone(), file_repo.clone(), notifier.clone()),
        folders: FolderService::new(folder_repo.clone(), file_repo.clone(), files.clone()),
        shares: ShareService::new(config, file_repo.clone(), notifier),
        files,
        file_repo,
        folder_repo,
    }
}

fn mock_services(pool: &PgPool) -> Services {
    build_services(pool, Config::for_tests())
}

/// A config whose cloud drive endpoints point at a closed port, so every
/// provider call fails fast with a connection error.
fn unreachable_drive_config() -> Config {
    let mut config = Config::for_tests();
    config.storage_provider = Some(ProviderKind::CloudDrive);
    config.drive_client_id = Some("id".to_string());
    config.drive_client_secret = Some("secret".to_string());
    config.drive_refresh_token = Some("refresh".to_string());
    config.drive_api_base = "http://127.0.0.1:9/drive/v3".to_string();
    config.drive_upload_base = "http://127.0.0.1:9/upload/drive/v3".to_string();
    config.drive_token_url = "http://127.0.0.1:9/token".to_string();
    config
}

fn notes_txt_meta() -> ProviderFileMeta {
    serde_json::from_str(
        r#"{"id":"abc123","name":"notes.txt","mimeType":"text/plain","size":"10240",
            "webViewLink":"https://x/view","webContentLink":"https://x/dl"}"#,
    )
    .unwrap()
}

#[tokio::test]
async fn test_finalize_creates_record_and_increments_usage() {
    let Some(pool) = test_pool().await else { return };
    let services = mock_services(&pool);
    let user_id = insert_user(&pool).await;

    let record = services
        .uploads
        .finalize(user_id, &notes_txt_meta(), None)
        .await
        .expect("finalize");

    assert_eq!(record.name, "notes.txt");
    assert_eq!(record.size_kb, 10);
    assert_eq!(record.external_id, "abc123");
    assert!(!record.external_id.is_empty());
    assert_eq!(usage_of(&pool, user_id).await, 10_240);
}

#[tokio::test]
async fn test_finalize_rejects_missing_external_id() {
    let Some(pool) = test_pool().await else { return };
    let services = mock_services(&pool);
    let user_id = insert_user(&pool).await;

    let mut meta = notes_txt_meta();
    meta.id = String::new();

    let result = services.uploads.finalize(user_id, &meta, None).await;
    assert!(matches!(result, Err(AppError::InvalidInput(_))));

    // Nothing persisted, nothing counted
    let files = services.file_repo.list_files(user_id, None, false).await.unwrap();
    assert!(files.is_empty());
    assert_eq!(usage_of(&pool, user_id).await, 0);
}

#[tokio::test]
async fn test_soft_delete_is_idempotent() {
    let Some(pool) = test_pool().await else { return };
    let services = mock_services(&pool);
    let user_id = insert_user(&pool).await;

    let record = services
        .uploads
        .finalize(user_id, &notes_txt_meta(), None)
        .await
        .unwrap();

    let first = services.files.delete_file(user_id, record.id).await.unwrap();
    assert!(first.success);

    let second = services.files.delete_file(user_id, record.id).await.unwrap();
    assert!(second.success);

    let stored = services.file_repo.get_file(user_id, record.id).await.unwrap().unwrap();
    assert!(stored.is_trash);
}

#[tokio::test]
async fn test_trash_then_restore_preserves_external_id() {
    let Some(pool) = test_pool().await else { return };
    let services = mock_services(&pool);
    let user_id = insert_user(&pool).await;

    let record = services
        .uploads
        .finalize(user_id, &notes_txt_meta(), None)
        .await
        .unwrap();

    services.files.delete_file(user_id, record.id).await.unwrap();
    services.files.restore_file(user_id, record.id).await.unwrap();

    let stored = services.file_repo.get_file(user_id, record.id).await.unwrap().unwrap();
    assert!(!stored.is_trash);
    assert_eq!(stored.external_id, record.external_id);
}

#[tokio::test]
async fn test_permanent_delete_decrements_only_owner() {
    let Some(pool) = test_pool().await else { return };
    let services = mock_services(&pool);
    let user_id = insert_user(&pool).await;
    let other_user = insert_user(&pool).await;

    let record = services
        .uploads
        .finalize(user_id, &notes_txt_meta(), None)
        .await
        .unwrap();
    let other_record = services
        .uploads
        .finalize(other_user, &notes_txt_meta(), None)
        .await
        .unwrap();

    services
        .files
        .delete_file_permanently(user_id, record.id)
        .await
        .unwrap();

    assert!(services.file_repo.get_file(user_id, record.id).await.unwrap().is_none());
    // Decremented by exactly the stored size (10 KB)
    assert_eq!(usage_of(&pool, user_id).await, 0);
    // The other user's counter and record are untouched
    assert_eq!(usage_of(&pool, other_user).await, 10_240);
    assert!(services
        .file_repo
        .get_file(other_user, other_record.id)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_concurrent_finalizes_do_not_lose_updates() {
    let Some(pool) = test_pool().await else { return };
    let services = mock_services(&pool);
    let user_id = insert_user(&pool).await;

    let sizes: Vec<u64> = vec![1024, 2048, 4096, 8192, 16384, 32768, 65536, 131072];
    let tasks = sizes.iter().enumerate().map(|(i, size)| {
        let uploads = services.uploads.clone();
        let meta: ProviderFileMeta = serde_json::from_value(serde_json::json!({
            "id": format!("ext-{}", i),
            "name": format!("file-{}.bin", i),
            "mimeType": "application/octet-stream",
            "size": size.to_string(),
        }))
        .unwrap();
        async move { uploads.finalize(user_id, &meta, None).await }
    });

    for result in futures::future::join_all(tasks).await {
        result.expect("finalize");
    }

    let expected: u64 = sizes.iter().sum();
    assert_eq!(usage_of(&pool, user_id).await, expected as i64);
}

#[tokio::test]
async fn test_soft_delete_with_failing_provider_warns_and_trashes() {
    let Some(pool) = test_pool().await else { return };
    let services = build_services(&pool, unreachable_drive_config());
    let user_id = insert_user(&pool).await;

    let record = services
        .file_repo
        .create_with_usage(
            user_id,
            None,
            "report.pdf",
            "application/pdf",
            5,
            ProviderKind::CloudDrive,
            "drive-ext-1",
            None,
            None,
            5 * 1024,
        )
        .await
        .unwrap();

    let response = services.files.delete_file(user_id, record.id).await.unwrap();
    assert!(response.success);
    assert_eq!(response.warning.as_deref(), Some("Cloud sync failed"));

    let stored = services.file_repo.get_file(user_id, record.id).await.unwrap().unwrap();
    assert!(stored.is_trash);
}

#[tokio::test]
async fn test_restore_with_failing_provider_fails_and_keeps_trash() {
    let Some(pool) = test_pool().await else { return };
    let services = build_services(&pool, unreachable_drive_config());
    let user_id = insert_user(&pool).await;

    let record = services
        .file_repo
        .create_with_usage(
            user_id,
            None,
            "report.pdf",
            "application/pdf",
            5,
            ProviderKind::CloudDrive,
            "drive-ext-2",
            None,
            None,
            5 * 1024,
        )
        .await
        .unwrap();
    services.file_repo.set_trash(user_id, record.id, true).await.unwrap();

    let result = services.files.restore_file(user_id, record.id).await;
    assert!(matches!(result, Err(AppError::Provider(_))));

    let stored = services.file_repo.get_file(user_id, record.id).await.unwrap().unwrap();
    assert!(stored.is_trash);
}

#[tokio::test]
async fn test_permanent_delete_with_failing_provider_preserves_record() {
    let Some(pool) = test_pool().await else { return };
    let services = build_services(&pool, unreachable_drive_config());
    let user_id = insert_user(&pool).await;

    let record = services
        .file_repo
        .create_with_usage(
            user_id,
            None,
            "report.pdf",
            "application/pdf",
            5,
            ProviderKind::CloudDrive,
            "drive-ext-3",
            None,
            None,
            5 * 1024,
        )
        .await
        .unwrap();

    let result = services.files.delete_file_permanently(user_id, record.id).await;
    assert!(result.is_err());

    // Record preserved, usage untouched
    assert!(services.file_repo.get_file(user_id, record.id).await.unwrap().is_some());
    assert_eq!(usage_of(&pool, user_id).await, 5 * 1024);
}

#[tokio::test]
async fn test_rename_with_failing_provider_still_renames_locally() {
    let Some(pool) = test_pool().await else { return };
    let services = build_services(&pool, unreachable_drive_config());
    let user_id = insert_user(&pool).await;

    let record = services
        .file_repo
        .create_with_usage(
            user_id,
            None,
            "old-name.txt",
            "text/plain",
            1,
            ProviderKind::CloudDrive,
            "drive-ext-4",
            None,
            None,
            1024,
        )
        .await
        .unwrap();

    services
        .files
        .rename_file(user_id, record.id, "new-name.txt")
        .await
        .expect("rename tolerates provider failure");

    let stored = services.file_repo.get_file(user_id, record.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "new-name.txt");
}

#[tokio::test]
async fn test_session_rejection_creates_nothing() {
    let Some(pool) = test_pool().await else { return };
    let services = build_services(&pool, unreachable_drive_config());
    let user_id = insert_user(&pool).await;

    let request = UploadSessionRequest {
        file_name: "notes.txt".to_string(),
        mime_type: Some("text/plain".to_string()),
        file_size: 10_240,
        parent_id: None,
        origin: Some("http://localhost:3000".to_string()),
    };

    let result = services.uploads.request_upload_session(user_id, &request).await;
    assert!(result.is_err());

    let files = services.file_repo.list_files(user_id, None, false).await.unwrap();
    assert!(files.is_empty());
}

#[tokio::test]
async fn test_folder_purge_discovers_subtree_via_path() {
    let Some(pool) = test_pool().await else { return };
    let services = mock_services(&pool);
    let user_id = insert_user(&pool).await;

    let parent = services
        .folders
        .create_folder(user_id, "projects", None)
        .await
        .unwrap();
    let child = services
        .folders
        .create_folder(user_id, "archive", Some(parent.id))
        .await
        .unwrap();
    assert!(child.has_ancestor(parent.id));

    // One file inside the subfolder
    let record = services
        .uploads
        .finalize(user_id, &notes_txt_meta(), Some(child.id))
        .await
        .unwrap();
    assert_eq!(usage_of(&pool, user_id).await, 10_240);

    let outcome = services
        .folders
        .delete_folder_permanently(user_id, parent.id)
        .await
        .unwrap();

    assert!(outcome.is_clean());
    assert_eq!(outcome.folders_removed, 2);
    assert_eq!(outcome.files_removed, 1);
    assert!(services.folder_repo.get_folder(user_id, parent.id).await.unwrap().is_none());
    assert!(services.folder_repo.get_folder(user_id, child.id).await.unwrap().is_none());
    assert!(services.file_repo.get_file(user_id, record.id).await.unwrap().is_none());
    assert_eq!(usage_of(&pool, user_id).await, 0);
}

#[tokio::test]
async fn test_share_file_and_download_by_token() {
    let Some(pool) = test_pool().await else { return };
    let services = mock_services(&pool);
    let user_id = insert_user(&pool).await;

    let record = services
        .uploads
        .finalize(user_id, &notes_txt_meta(), None)
        .await
        .unwrap();

    // Mock provider doesn't support make_public; sharing still works locally
    let (token, view_url) = services.shares.share_file(user_id, record.id).await.unwrap();
    assert_eq!(token.len(), 6);
    assert!(view_url.is_none());

    let (shared, _stream) = services.shares.download_by_token(&token).await.unwrap();
    assert_eq!(shared.id, record.id);
    assert!(shared.is_public);
}
