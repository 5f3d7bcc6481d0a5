//! Shared constants

/// Default per-user storage quota: 1 GiB.
pub const DEFAULT_STORAGE_QUOTA_BYTES: i64 = 1_073_741_824;

/// Fields requested from the provider when creating a resumable session,
/// so the completion response body carries everything finalize needs.
pub const RESUMABLE_RESPONSE_FIELDS: &str = "id,name,mimeType,size,webViewLink,webContentLink";

/// External identifier substituted when the provider's completion response
/// cannot be parsed. Finalize accepts it; see DESIGN.md.
pub const UNKNOWN_EXTERNAL_ID: &str = "unknown";
