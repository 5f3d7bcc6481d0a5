//! Upload task arena.
//!
//! Each selected file gets an `UploadTask` keyed by its own id. Status
//! moves strictly Pending -> Uploading -> {Completed | Failed}, never
//! backward; the arena enforces the transitions so a late progress event
//! can't resurrect a finished task.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Pending,
    Uploading,
    Completed,
    Failed,
}

impl UploadStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, UploadStatus::Completed | UploadStatus::Failed)
    }

    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }
}

/// One in-flight (or finished) upload.
#[derive(Debug, Clone)]
pub struct UploadTask {
    pub id: Uuid,
    pub name: String,
    pub byte_size: u64,
    pub progress_percent: u8,
    pub status: UploadStatus,
    pub error: Option<String>,
    pub created_at: Instant,
}

impl UploadTask {
    fn new(name: String, byte_size: u64) -> Self {
        UploadTask {
            id: Uuid::new_v4(),
            name,
            byte_size,
            progress_percent: 0,
            status: UploadStatus::Pending,
            error: None,
            created_at: Instant::now(),
        }
    }
}

/// Aggregate counts for the summary widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSummary {
    pub active: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Arena of upload tasks with explicit insert/update/remove operations.
#[derive(Clone, Default)]
pub struct UploadSet {
    inner: Arc<Mutex<HashMap<Uuid, UploadTask>>>,
}

impl UploadSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new Pending task and return its id.
    pub fn insert(&self, name: impl Into<String>, byte_size: u64) -> Uuid {
        let task = UploadTask::new(name.into(), byte_size);
        let id = task.id;
        self.inner.lock().expect("upload set lock").insert(id, task);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<UploadTask> {
        self.inner.lock().expect("upload set lock").get(&id).cloned()
    }

    /// Pending -> Uploading. No-op on a task already past Pending.
    pub fn mark_uploading(&self, id: Uuid) {
        let mut tasks = self.inner.lock().expect("upload set lock");
        if let Some(task) = tasks.get_mut(&id) {
            if task.status == UploadStatus::Pending {
                task.status = UploadStatus::Uploading;
                task.progress_percent = 0;
            }
        }
    }

    /// Update progress while Uploading. Terminal tasks are left alone.
    pub fn set_progress(&self, id: Uuid, percent: u8) {
        let mut tasks = self.inner.lock().expect("upload set lock");
        if let Some(task) = tasks.get_mut(&id) {
            if task.status == UploadStatus::Uploading {
                task.progress_percent = percent.min(100);
            }
        }
    }

    /// Transition to Completed (terminal).
    pub fn mark_completed(&self, id: Uuid) {
        let mut tasks = self.inner.lock().expect("upload set lock");
        if let Some(task) = tasks.get_mut(&id) {
            if !task.status.is_terminal() {
                task.status = UploadStatus::Completed;
                task.progress_percent = 100;
            }
        }
    }

    /// Transition to Failed with a user-visible message (terminal).
    pub fn mark_failed(&self, id: Uuid, error: impl Into<String>) {
        let mut tasks = self.inner.lock().expect("upload set lock");
        if let Some(task) = tasks.get_mut(&id) {
            if !task.status.is_terminal() {
                task.status = UploadStatus::Failed;
                task.error = Some(error.into());
            }
        }
    }

    /// Snapshot of all tasks, newest first (summary-widget order).
    pub fn list(&self) -> Vec<UploadTask> {
        let tasks = self.inner.lock().expect("upload set lock");
        let mut list: Vec<UploadTask> = tasks.values().cloned().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        list
    }

    pub fn summary(&self) -> TaskSummary {
        let tasks = self.inner.lock().expect("upload set lock");
        let mut summary = TaskSummary {
            active: 0,
            completed: 0,
            failed: 0,
        };
        for task in tasks.values() {
            match task.status {
                UploadStatus::Pending | UploadStatus::Uploading => summary.active += 1,
                UploadStatus::Completed => summary.completed += 1,
                UploadStatus::Failed => summary.failed += 1,
            }
        }
        summary
    }

    /// Dismissing the widget clears finished entries only; active
    /// transfers keep running and stay visible.
    pub fn clear_finished(&self) {
        self.inner
            .lock()
            .expect("upload set lock")
            .retain(|_, task| task.status.is_active());
    }

    pub fn remove(&self, id: Uuid) -> Option<UploadTask> {
        self.inner.lock().expect("upload set lock").remove(&id)
    }
}
