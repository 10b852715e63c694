//! Event fan-out from the client logic to whatever renders it.

use serde::Serialize;
use tokio::sync::broadcast;

use ruah_shared::MessageId;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Things the UI reacts to outside its own request/response cycle.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum AppEvent {
    NewMessage { message_id: MessageId },
    StreakUpdated { streak: u32 },
    ScoreUpdated { score: u32 },
}

/// Broadcast bus for [`AppEvent`]s. Cloning shares the channel.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AppEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.tx.subscribe()
    }

    /// Deliver to whoever is listening. No listeners is normal.
    pub fn emit(&self, event: AppEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("event emitted with no subscribers");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_reach_all_subscribers() {
        let bus = EventBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.emit(AppEvent::StreakUpdated { streak: 7 });
        assert_eq!(first.recv().await.unwrap(), AppEvent::StreakUpdated { streak: 7 });
        assert_eq!(second.recv().await.unwrap(), AppEvent::StreakUpdated { streak: 7 });
    }

    #[test]
    fn emit_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.emit(AppEvent::ScoreUpdated { score: 10 });
    }
}
