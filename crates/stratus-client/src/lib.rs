//! Stratus client library
//!
//! The client-resident upload controller: for each selected file it
//! requests a resumable session from the server, performs the direct
//! binary transfer to the provider with progress events, and reports
//! completion back for persistence. Tasks run concurrently and
//! independently; one failure never affects another. Interested UI
//! components subscribe to the typed event bus instead of ambient
//! signaling.

pub mod api;
pub mod events;
pub mod tasks;
pub mod uploader;

pub use api::ApiClient;
pub use events::{EventBus, UploadEvent};
pub use tasks::{TaskSummary, UploadSet, UploadStatus, UploadTask};
pub use uploader::{UploadSource, Uploader};
