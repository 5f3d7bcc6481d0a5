use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage provider kinds
///
/// This enum names the available storage backends. It's defined in core
/// because it's used in configuration and persisted on file records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "storage_provider", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    CloudDrive,
    LocalMock,
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cloud_drive" => Ok(ProviderKind::CloudDrive),
            "local_mock" => Ok(ProviderKind::LocalMock),
            _ => Err(anyhow::anyhow!("Invalid storage provider: {}", s)),
        }
    }
}

impl Display for ProviderKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ProviderKind::CloudDrive => write!(f, "cloud_drive"),
            ProviderKind::LocalMock => write!(f, "local_mock"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_round_trip() {
        assert_eq!(
            "cloud_drive".parse::<ProviderKind>().unwrap(),
            ProviderKind::CloudDrive
        );
        assert_eq!(ProviderKind::LocalMock.to_string(), "local_mock");
    }

    #[test]
    fn test_provider_kind_unknown() {
        assert!("dropbox".parse::<ProviderKind>().is_err());
    }
}
