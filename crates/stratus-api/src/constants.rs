/// API version prefix for all routes.
pub const API_PREFIX: &str = "/api/v1";

/// Server-proxied uploads are the small-file path; larger transfers go
/// direct-to-provider through a resumable session.
pub const MAX_PROXIED_UPLOAD_BYTES: usize = 25 * 1024 * 1024;
