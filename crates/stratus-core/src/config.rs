//! Configuration module
//!
//! Environment-driven configuration for the API server and the storage
//! adapters. `Config::from_env()` reads a `.env` file when present, applies
//! defaults, and validates the settings that have no sensible default.

use std::env;

use crate::constants::DEFAULT_STORAGE_QUOTA_BYTES;
use crate::provider::ProviderKind;

const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_DB_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MOCK_LATENCY_MS: u64 = 50;

// Cloud drive endpoints; overridable so tests can point the adapter at a stub.
const DEFAULT_DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";
const DEFAULT_DRIVE_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";
const DEFAULT_DRIVE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub default_quota_bytes: i64,
    // Storage provider selection
    pub storage_provider: Option<ProviderKind>,
    // Cloud drive credentials
    pub drive_client_id: Option<String>,
    pub drive_client_secret: Option<String>,
    pub drive_refresh_token: Option<String>,
    pub drive_root_folder_id: Option<String>,
    // Cloud drive endpoints
    pub drive_api_base: String,
    pub drive_upload_base: String,
    pub drive_token_url: String,
    // Mock adapter
    pub mock_latency_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let storage_provider = match env::var("STORAGE_PROVIDER") {
            Ok(v) if !v.is_empty() => Some(v.parse::<ProviderKind>()?),
            _ => None,
        };

        let config = Config {
            server_port: env_parse("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL not configured"))?,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
            db_timeout_seconds: env_parse("DB_TIMEOUT_SECONDS", DEFAULT_DB_TIMEOUT_SECS)?,
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET not configured"))?,
            default_quota_bytes: env_parse("DEFAULT_QUOTA_BYTES", DEFAULT_STORAGE_QUOTA_BYTES)?,
            storage_provider,
            drive_client_id: env_opt("DRIVE_CLIENT_ID"),
            drive_client_secret: env_opt("DRIVE_CLIENT_SECRET"),
            drive_refresh_token: env_opt("DRIVE_REFRESH_TOKEN"),
            drive_root_folder_id: env_opt("DRIVE_ROOT_FOLDER_ID"),
            drive_api_base: env::var("DRIVE_API_BASE")
                .unwrap_or_else(|_| DEFAULT_DRIVE_API_BASE.to_string()),
            drive_upload_base: env::var("DRIVE_UPLOAD_BASE")
                .unwrap_or_else(|_| DEFAULT_DRIVE_UPLOAD_BASE.to_string()),
            drive_token_url: env::var("DRIVE_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_DRIVE_TOKEN_URL.to_string()),
            mock_latency_ms: env_parse("MOCK_LATENCY_MS", DEFAULT_MOCK_LATENCY_MS)?,
        };

        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// True when the cloud drive adapter has a complete credential set.
    pub fn has_drive_credentials(&self) -> bool {
        self.drive_client_id.is_some()
            && self.drive_client_secret.is_some()
            && self.drive_refresh_token.is_some()
    }

    /// A config suitable for tests: mock storage, no latency, throwaway secrets.
    pub fn for_tests() -> Self {
        Config {
            server_port: 0,
            cors_origins: Vec::new(),
            environment: "test".to_string(),
            database_url: "postgres://localhost/stratus_test".to_string(),
            db_max_connections: 2,
            db_timeout_seconds: 5,
            jwt_secret: "test-secret".to_string(),
            default_quota_bytes: DEFAULT_STORAGE_QUOTA_BYTES,
            storage_provider: Some(ProviderKind::LocalMock),
            drive_client_id: None,
            drive_client_secret: None,
            drive_refresh_token: None,
            drive_root_folder_id: None,
            drive_api_base: DEFAULT_DRIVE_API_BASE.to_string(),
            drive_upload_base: DEFAULT_DRIVE_UPLOAD_BASE.to_string(),
            drive_token_url: DEFAULT_DRIVE_TOKEN_URL.to_string(),
            mock_latency_ms: 0,
        }
    }
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T, anyhow::Error>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(v) if !v.is_empty() => v
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid {}: {}", key, e)),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_tests_uses_mock_provider() {
        let config = Config::for_tests();
        assert_eq!(config.storage_provider, Some(ProviderKind::LocalMock));
        assert_eq!(config.mock_latency_ms, 0);
        assert!(!config.is_production());
        assert!(!config.has_drive_credentials());
    }
}
