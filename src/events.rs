use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use uuid::Uuid;

pub const ROOM_GLOBAL: &str = "global";

pub fn product_room(id: Uuid) -> String {
    format!("product_{id}")
}

pub fn supplier_room(id: Uuid) -> String {
    format!("supplier_{id}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ProductUpdate,
    TrackingUpdate,
    PredictionUpdate,
    Alert,
}

/// One update pushed to WebSocket subscribers. Events always reach `global`
/// subscribers in addition to the named room.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub room: String,
    pub data: Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone)]
pub struct EventHub {
    tx: broadcast::Sender<UpdateEvent>,
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UpdateEvent> {
        self.tx.subscribe()
    }

    /// Fan an event out to a room. Lagging or absent receivers are not an
    /// error; the send result only reports whether anyone is listening.
    pub fn publish(&self, kind: EventKind, room: String, data: Value) {
        let event = UpdateEvent {
            kind,
            room,
            data,
            timestamp: Utc::now(),
        };
        if self.tx.send(event.clone()).is_err() {
            tracing::debug!(room = %event.room, "no websocket subscribers for event");
        }
    }

    pub fn publish_global(&self, kind: EventKind, data: Value) {
        self.publish(kind, ROOM_GLOBAL.to_string(), data);
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new(256)
    }
}
