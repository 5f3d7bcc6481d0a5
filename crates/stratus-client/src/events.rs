//! Typed event bus for cross-component refresh.
//!
//! Components that need to react to upload lifecycle changes (the
//! summary widget, the storage meter, the file listing) subscribe here;
//! there is no ambient process-wide signaling.

use tokio::sync::broadcast;
use uuid::Uuid;

const BUS_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadEvent {
    /// A task's status or progress changed.
    TaskUpdated(Uuid),
    /// A finalize succeeded: storage usage and listings are stale.
    StorageChanged,
}

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<UploadEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BUS_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UploadEvent> {
        self.sender.subscribe()
    }

    /// Emitting with no subscribers is fine; events are advisory.
    pub fn emit(&self, event: UploadEvent) {
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        let id = Uuid::new_v4();
        bus.emit(UploadEvent::TaskUpdated(id));
        bus.emit(UploadEvent::StorageChanged);

        assert_eq!(rx.recv().await.unwrap(), UploadEvent::TaskUpdated(id));
        assert_eq!(rx.recv().await.unwrap(), UploadEvent::StorageChanged);
    }

    #[test]
    fn test_emit_without_subscribers_is_ok() {
        let bus = EventBus::new();
        bus.emit(UploadEvent::StorageChanged);
    }
}
