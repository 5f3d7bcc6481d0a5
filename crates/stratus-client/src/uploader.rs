//! The per-file upload state machine.
//!
//! Each file runs the same five steps: obtain a session URL from the
//! server, PUT the bytes directly to the provider while reporting
//! progress, interpret the provider's completion body, submit it to the
//! server's finalize step, and flip the task to its terminal state.
//! Files in a batch run concurrently with no explicit cap; the HTTP
//! client's connection pool is the only throttle. A failed task is
//! terminal - retrying means re-selecting the file.

use crate::api::ApiClient;
use crate::events::{EventBus, UploadEvent};
use crate::tasks::UploadSet;
use bytes::Bytes;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use stratus_core::constants::UNKNOWN_EXTERNAL_ID;
use stratus_core::models::{ProviderFileMeta, UploadSessionRequest};
use uuid::Uuid;

const PROGRESS_CHUNK_BYTES: usize = 64 * 1024;

/// A file selected for upload, already read into memory by the caller.
#[derive(Debug, Clone)]
pub struct UploadSource {
    pub name: String,
    pub mime_type: Option<String>,
    pub data: Vec<u8>,
}

/// `floor(sent / total * 100)`, clamped to 100. An empty file is done the
/// moment its (empty) body is accepted.
pub fn progress_percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    ((sent * 100 / total).min(100)) as u8
}

/// Interpret the provider's completion body. A non-JSON body (some
/// providers answer an empty 200) degrades to placeholder metadata with
/// an unknown identifier and the originally-declared size, rather than
/// failing an upload that already succeeded.
fn parse_completion(
    body: &str,
    file_name: &str,
    mime_type: &str,
    declared_size: u64,
) -> ProviderFileMeta {
    match serde_json::from_str::<ProviderFileMeta>(body) {
        Ok(meta) => meta,
        Err(e) => {
            tracing::warn!(
                error = %e,
                file_name = %file_name,
                "Provider completion response was not parseable; substituting placeholder metadata"
            );
            ProviderFileMeta {
                id: UNKNOWN_EXTERNAL_ID.to_string(),
                name: Some(file_name.to_string()),
                mime_type: Some(mime_type.to_string()),
                size: Some(declared_size),
                web_view_link: None,
                web_content_link: None,
            }
        }
    }
}

/// Client-side upload controller: owns the task arena and the event bus,
/// and drives one state machine per file.
#[derive(Clone)]
pub struct Uploader {
    api: ApiClient,
    tasks: UploadSet,
    events: EventBus,
}

impl Uploader {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            tasks: UploadSet::new(),
            events: EventBus::new(),
        }
    }

    pub fn tasks(&self) -> &UploadSet {
        &self.tasks
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Register every file as a Pending task, then start them all
    /// concurrently. Returns the task ids in input order.
    pub fn start_batch(
        &self,
        files: Vec<UploadSource>,
        parent_id: Option<Uuid>,
        origin: Option<String>,
    ) -> Vec<Uuid> {
        let mut started = Vec::with_capacity(files.len());
        for file in files {
            let task_id = self.tasks.insert(file.name.clone(), file.data.len() as u64);
            started.push(task_id);

            let uploader = self.clone();
            let origin = origin.clone();
            tokio::spawn(async move {
                uploader.upload_single(task_id, file, parent_id, origin).await;
            });
        }
        started
    }

    /// Drive one file through the full state machine. Public so callers
    /// that want to await a single upload (tests, CLIs) can do so without
    /// polling the arena.
    pub async fn upload_single(
        &self,
        task_id: Uuid,
        file: UploadSource,
        parent_id: Option<Uuid>,
        origin: Option<String>,
    ) {
        match self.run_upload(task_id, file, parent_id, origin).await {
            Ok(()) => {
                self.tasks.mark_completed(task_id);
                self.events.emit(UploadEvent::TaskUpdated(task_id));
                self.events.emit(UploadEvent::StorageChanged);
            }
            Err(message) => {
                tracing::warn!(task_id = %task_id, error = %message, "Upload failed");
                self.tasks.mark_failed(task_id, &message);
                self.events.emit(UploadEvent::TaskUpdated(task_id));
            }
        }
    }

    async fn run_upload(
        &self,
        task_id: Uuid,
        file: UploadSource,
        parent_id: Option<Uuid>,
        origin: Option<String>,
    ) -> Result<(), String> {
        self.tasks.mark_uploading(task_id);
        self.events.emit(UploadEvent::TaskUpdated(task_id));

        let mime_type = file
            .mime_type
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let total = file.data.len() as u64;

        // 1. Resumable session from the server. No automatic retry.
        let session = self
            .api
            .request_upload_session(&UploadSessionRequest {
                file_name: file.name.clone(),
                mime_type: Some(mime_type.clone()),
                file_size: total,
                parent_id,
                origin,
            })
            .await
            .map_err(|e| format!("Failed to init upload session: {}", e))?;

        if !session.success || session.upload_url.is_empty() {
            return Err("Server returned no upload URL".to_string());
        }

        // 2. Direct binary transfer to the session URL. The Content-Type
        // must match what the session was created with.
        let body = self.counting_body(task_id, file.data, total);
        let response = self
            .api
            .http()
            .put(&session.upload_url)
            .header(CONTENT_TYPE, mime_type.as_str())
            .header(CONTENT_LENGTH, total)
            .body(body)
            .send()
            .await
            .map_err(|e| format!("Network error during upload: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("Provider upload failed: {}", status));
        }

        // 3. Completion metadata, with the lenient fallback.
        let completion_body = response.text().await.unwrap_or_default();
        let meta = parse_completion(&completion_body, &file.name, &mime_type, total);

        // 4. Finalize on the server. The provider-side file is orphaned if
        // this fails; no compensation is attempted.
        let result = self
            .api
            .finalize_upload(meta, parent_id)
            .await
            .map_err(|e| format!("Failed to finalize upload record: {}", e))?;

        if !result.success {
            return Err("Failed to finalize upload record".to_string());
        }

        Ok(())
    }

    /// A request body that reports progress as the transport consumes it.
    fn counting_body(&self, task_id: Uuid, data: Vec<u8>, total: u64) -> reqwest::Body {
        let bytes = Bytes::from(data);
        let mut chunks = Vec::with_capacity(bytes.len() / PROGRESS_CHUNK_BYTES + 1);
        let mut offset = 0;
        while offset < bytes.len() {
            let end = (offset + PROGRESS_CHUNK_BYTES).min(bytes.len());
            chunks.push(bytes.slice(offset..end));
            offset = end;
        }

        let sent = Arc::new(AtomicU64::new(0));
        let tasks = self.tasks.clone();
        let events = self.events.clone();

        let stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
            let sent_now = sent.fetch_add(chunk.len() as u64, Ordering::Relaxed) + chunk.len() as u64;
            tasks.set_progress(task_id, progress_percent(sent_now, total));
            events.emit(UploadEvent::TaskUpdated(task_id));
            Ok::<Bytes, std::io::Error>(chunk)
        }));

        reqwest::Body::wrap_stream(stream)
    }

    /// Alternate server-proxied path for small files: one multipart
    /// request per file, uploaded sequentially rather than concurrently.
    pub async fn upload_via_server(
        &self,
        files: Vec<UploadSource>,
        parent_id: Option<Uuid>,
    ) -> Vec<Uuid> {
        let mut finished = Vec::with_capacity(files.len());

        for file in files {
            let task_id = self.tasks.insert(file.name.clone(), file.data.len() as u64);
            finished.push(task_id);
            self.tasks.mark_uploading(task_id);
            self.events.emit(UploadEvent::TaskUpdated(task_id));

            let mime_type = file
                .mime_type
                .clone()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "application/octet-stream".to_string());

            let outcome = self
                .api
                .upload_via_server(&file.name, &mime_type, file.data, parent_id)
                .await;

            match outcome {
                Ok(result) if result.success => {
                    self.tasks.mark_completed(task_id);
                    self.events.emit(UploadEvent::TaskUpdated(task_id));
                    self.events.emit(UploadEvent::StorageChanged);
                }
                Ok(_) => {
                    self.tasks.mark_failed(task_id, "Upload rejected by server");
                    self.events.emit(UploadEvent::TaskUpdated(task_id));
                }
                Err(e) => {
                    self.tasks.mark_failed(task_id, e.to_string());
                    self.events.emit(UploadEvent::TaskUpdated(task_id));
                }
            }
        }

        finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::UploadStatus;

    #[test]
    fn test_progress_percent_floors() {
        assert_eq!(progress_percent(0, 10_240), 0);
        assert_eq!(progress_percent(5_120, 10_240), 50);
        assert_eq!(progress_percent(10_239, 10_240), 99);
        assert_eq!(progress_percent(10_240, 10_240), 100);
        assert_eq!(progress_percent(1, 300), 0);
        assert_eq!(progress_percent(0, 0), 100);
    }

    #[test]
    fn test_parse_completion_valid_body() {
        let meta = parse_completion(
            r#"{"id":"abc123","name":"notes.txt","mimeType":"text/plain","size":"10240"}"#,
            "notes.txt",
            "text/plain",
            10_240,
        );
        assert_eq!(meta.id, "abc123");
        assert_eq!(meta.size, Some(10_240));
    }

    #[test]
    fn test_parse_completion_falls_back_on_garbage() {
        let meta = parse_completion("", "notes.txt", "text/plain", 10_240);
        assert_eq!(meta.id, UNKNOWN_EXTERNAL_ID);
        assert_eq!(meta.name.as_deref(), Some("notes.txt"));
        assert_eq!(meta.size, Some(10_240));

        let meta = parse_completion("<html>not json</html>", "a.bin", "application/octet-stream", 7);
        assert_eq!(meta.id, UNKNOWN_EXTERNAL_ID);
        assert_eq!(meta.size, Some(7));
    }

    fn unreachable_uploader() -> Uploader {
        // Nothing listens on port 9; every server call fails fast.
        let api = ApiClient::new("http://127.0.0.1:9".to_string(), "token".to_string()).unwrap();
        Uploader::new(api)
    }

    #[tokio::test]
    async fn test_session_failure_fails_task_with_message() {
        let uploader = unreachable_uploader();
        let mut rx = uploader.events().subscribe();

        let task_id = uploader.tasks().insert("notes.txt", 5);
        uploader
            .upload_single(
                task_id,
                UploadSource {
                    name: "notes.txt".to_string(),
                    mime_type: Some("text/plain".to_string()),
                    data: b"hello".to_vec(),
                },
                None,
                None,
            )
            .await;

        let task = uploader.tasks().get(task_id).unwrap();
        assert_eq!(task.status, UploadStatus::Failed);
        let error = task.error.unwrap();
        assert!(error.contains("Failed to init upload session"), "{}", error);

        // At least the Uploading transition and the terminal update
        assert!(matches!(
            rx.try_recv(),
            Ok(UploadEvent::TaskUpdated(id)) if id == task_id
        ));
    }

    #[tokio::test]
    async fn test_batch_failures_are_independent_and_concurrent() {
        let uploader = unreachable_uploader();

        let ids = uploader.start_batch(
            vec![
                UploadSource {
                    name: "a.txt".to_string(),
                    mime_type: None,
                    data: vec![1, 2, 3],
                },
                UploadSource {
                    name: "b.txt".to_string(),
                    mime_type: None,
                    data: vec![4, 5],
                },
            ],
            None,
            Some("http://localhost:3000".to_string()),
        );
        assert_eq!(ids.len(), 2);

        // Wait for both spawned tasks to reach a terminal state
        for _ in 0..100 {
            let summary = uploader.tasks().summary();
            if summary.active == 0 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        }

        let summary = uploader.tasks().summary();
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.completed, 0);
        for id in ids {
            let task = uploader.tasks().get(id).unwrap();
            assert_eq!(task.status, UploadStatus::Failed);
            assert!(task.error.is_some());
        }
    }

    #[tokio::test]
    async fn test_proxied_path_failure_marks_failed() {
        let uploader = unreachable_uploader();

        let ids = uploader
            .upload_via_server(
                vec![UploadSource {
                    name: "small.txt".to_string(),
                    mime_type: Some("text/plain".to_string()),
                    data: b"tiny".to_vec(),
                }],
                None,
            )
            .await;

        let task = uploader.tasks().get(ids[0]).unwrap();
        assert_eq!(task.status, UploadStatus::Failed);
    }
}
