use crate::{CloudDriveProvider, MockProvider, StorageProvider, StorageResult};
use std::sync::Arc;
use stratus_core::{Config, ProviderKind};

/// Select a storage provider by name.
///
/// Pure factory: a fresh adapter is constructed per call, so concurrent
/// requests never share adapter state. An unknown or absent name falls
/// back to the configured default, and failing that, to the mock.
pub fn provider_for(
    name: Option<&str>,
    config: &Config,
) -> StorageResult<Arc<dyn StorageProvider>> {
    let kind = name
        .and_then(|n| n.parse::<ProviderKind>().ok())
        .or(config.storage_provider)
        .unwrap_or(ProviderKind::LocalMock);

    match kind {
        ProviderKind::CloudDrive => Ok(Arc::new(CloudDriveProvider::from_config(config)?)),
        ProviderKind::LocalMock => Ok(Arc::new(MockProvider::new(config.mock_latency_ms))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_name_falls_back_to_mock() {
        let mut config = Config::for_tests();
        config.storage_provider = None;

        let provider = provider_for(Some("dropbox"), &config).unwrap();
        assert_eq!(provider.kind(), ProviderKind::LocalMock);

        let provider = provider_for(None, &config).unwrap();
        assert_eq!(provider.kind(), ProviderKind::LocalMock);
    }

    #[test]
    fn test_explicit_name_overrides_config_default() {
        let mut config = Config::for_tests();
        config.drive_client_id = Some("id".to_string());
        config.drive_client_secret = Some("secret".to_string());
        config.drive_refresh_token = Some("refresh".to_string());
        config.storage_provider = Some(ProviderKind::LocalMock);

        let provider = provider_for(Some("cloud_drive"), &config).unwrap();
        assert_eq!(provider.kind(), ProviderKind::CloudDrive);
    }

    #[test]
    fn test_cloud_drive_without_credentials_errors() {
        let config = Config::for_tests();
        assert!(provider_for(Some("cloud_drive"), &config).is_err());
    }

    #[test]
    fn test_each_call_returns_fresh_instance() {
        let config = Config::for_tests();
        let a = provider_for(None, &config).unwrap();
        let b = provider_for(None, &config).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
