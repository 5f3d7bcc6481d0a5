use rand::Rng;
use stratus_core::models::{FileRecord, NotificationKind};
use stratus_core::{AppError, Config};
use stratus_db::FileRepository;
use stratus_storage::{provider_for, ByteStream, Capability};
use uuid::Uuid;

use crate::notifier::Notifier;

const TOKEN_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const TOKEN_LEN: usize = 6;

/// Public share links for files.
///
/// Publishing makes the provider-side object world-readable on a
/// best-effort basis; the share page works through the server-side
/// streaming proxy either way.
#[derive(Clone)]
pub struct ShareService {
    config: Config,
    files: FileRepository,
    notifier: Notifier,
}

fn generate_share_token() -> String {
    let mut rng = rand::rng();
    (0..TOKEN_LEN)
        .map(|_| TOKEN_CHARS[rng.random_range(0..TOKEN_CHARS.len())] as char)
        .collect()
}

impl ShareService {
    pub fn new(config: Config, files: FileRepository, notifier: Notifier) -> Self {
        Self {
            config,
            files,
            notifier,
        }
    }

    /// Publish a share link: best-effort `make_public` at the provider,
    /// then mark the record public under a fresh token.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, file_id = %file_id))]
    pub async fn share_file(
        &self,
        user_id: Uuid,
        file_id: Uuid,
    ) -> Result<(String, Option<String>), AppError> {
        let record = self
            .files
            .get_file(user_id, file_id)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found or not synced".to_string()))?;

        let provider = provider_for(Some(&record.provider.to_string()), &self.config)?;

        let view_url = if provider.supports(Capability::MakePublic) {
            // make_public degrades to None on provider failure by contract
            provider
                .make_public(&record.external_id)
                .await
                .ok()
                .flatten()
        } else {
            None
        };

        let token = generate_share_token();
        self.files.publish_share(user_id, file_id, &token).await?;

        tracing::info!(
            user_id = %user_id,
            file_id = %file_id,
            public_at_provider = view_url.is_some(),
            "Share link published"
        );

        self.notifier.notify(
            user_id,
            NotificationKind::Share,
            "File shared",
            format!("{} is now shared via a public link", record.name),
        );

        Ok((token, view_url))
    }

    /// Resolve a public share token and stream the file's content.
    #[tracing::instrument(skip(self))]
    pub async fn download_by_token(
        &self,
        token: &str,
    ) -> Result<(FileRecord, ByteStream), AppError> {
        let record = self
            .files
            .get_by_share_token(token)
            .await?
            .ok_or_else(|| AppError::NotFound("Share link not found".to_string()))?;

        let provider = provider_for(Some(&record.provider.to_string()), &self.config)?;
        let stream = provider.download_stream(&record.external_id).await?;

        Ok((record, stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_token_shape() {
        let token = generate_share_token();
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_share_tokens_vary() {
        let a = generate_share_token();
        let b = generate_share_token();
        let c = generate_share_token();
        // Three consecutive tokens colliding would be astronomically rare.
        assert!(!(a == b && b == c));
    }
}
