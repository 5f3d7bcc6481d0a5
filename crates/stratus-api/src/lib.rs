//! Stratus API server library
//!
//! HTTP surface for the storage core: upload session issuance and
//! finalization, the file/folder lifecycle, share links, and account
//! summaries. Handlers convert every domain error into a structured
//! `{success: false, error, code}` body; raw errors never cross to the
//! presentation layer.

pub mod api_doc;
pub mod auth;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;

pub use state::AppState;
