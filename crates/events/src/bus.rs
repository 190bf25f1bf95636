//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` between the engine services
//! and any listeners such as the console UI.

use backstreet_core::types::{PlayerId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// GameEvent
// ---------------------------------------------------------------------------

/// Something that happened in a player's game.
///
/// Constructed via [`GameEvent::new`] and enriched with
/// [`with_player`](GameEvent::with_player) and
/// [`with_payload`](GameEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameEvent {
    /// Dot-separated event name, e.g. `"mission.resolved"`.
    pub event_type: String,

    /// Player the event belongs to, if any.
    pub player_id: Option<PlayerId>,

    /// Event-specific JSON data.
    pub payload: serde_json::Value,

    pub timestamp: Timestamp,
}

impl GameEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            player_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_player(mut self, player_id: impl Into<PlayerId>) -> Self {
        self.player_id = Some(player_id.into());
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// String field of the payload, if present.
    pub fn payload_str(&self, field: &str) -> Option<&str> {
        self.payload.get(field).and_then(serde_json::Value::as_str)
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// ```rust
/// use backstreet_events::bus::{EventBus, GameEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(GameEvent::new("mission.started"));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<GameEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest unread events are dropped and slow
    /// receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Dropped if nobody listens.
    pub fn publish(&self, event: GameEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let event = GameEvent::new("mission.started")
            .with_player("u-1")
            .with_payload(serde_json::json!({"mission_id": "deal_weed_alley"}));
        bus.publish(event);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event_type, "mission.started");
        assert_eq!(received.player_id.as_deref(), Some("u-1"));
        assert_eq!(received.payload_str("mission_id"), Some("deal_weed_alley"));
    }

    #[tokio::test]
    async fn every_subscriber_sees_every_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(GameEvent::new("stamina.changed"));

        assert_eq!(rx1.recv().await.unwrap().event_type, "stamina.changed");
        assert_eq!(rx2.recv().await.unwrap().event_type, "stamina.changed");
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        let bus = EventBus::new(4);
        bus.publish(GameEvent::new("mission.progress"));
    }

    #[test]
    fn default_payload_is_empty_object() {
        let event = GameEvent::new("x");
        assert!(event.payload.as_object().is_some_and(|o| o.is_empty()));
        assert!(event.player_id.is_none());
    }
}
