use stratus_core::models::NotificationKind;
use stratus_db::NotificationRepository;
use uuid::Uuid;

/// Fire-and-forget notification delivery.
///
/// The insert runs on a spawned task; a delivery failure is logged and
/// never fails the operation that produced the notification.
#[derive(Clone)]
pub struct Notifier {
    repository: NotificationRepository,
}

impl Notifier {
    pub fn new(repository: NotificationRepository) -> Self {
        Self { repository }
    }

    pub fn notify(
        &self,
        user_id: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) {
        let repository = self.repository.clone();
        let title = title.into();
        let message = message.into();

        tokio::spawn(async move {
            if let Err(e) = repository.create(user_id, kind, &title, &message).await {
                tracing::warn!(
                    error = %e,
                    user_id = %user_id,
                    "Failed to deliver notification"
                );
            }
        });
    }
}
