use parley_shared::{Message, RoomId, User};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::auth::LoginStep;

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Transient user-facing notice (a toast in a graphical front end).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEvent {
    RoomCreated { room_id: RoomId, title: String },
    RoomDeleted { room_id: RoomId },
    ActiveRoomChanged { room_id: Option<RoomId> },
    MessageAdded { room_id: RoomId, message: Message },
    RespondingChanged { room_id: RoomId, responding: bool },
    HistoryLoaded { room_id: RoomId, count: usize, has_more: bool },
    LoginStepChanged { step: LoginStep },
    SessionChanged { user: Option<User> },
    Notice(Notice),
}

/// Fan-out of [`ClientEvent`]s to every subscribed view.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ClientEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: ClientEvent) {
        // A send error only means nobody is listening right now.
        if self.tx.send(event).is_err() {
            tracing::trace!("event dropped, no subscribers");
        }
    }

    pub fn notice(&self, level: NoticeLevel, title: &str, message: impl Into<String>) {
        self.emit(ClientEvent::Notice(Notice::new(level, title, message)));
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
