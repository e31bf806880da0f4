//! Domain records shared by the store and the client.
//!
//! Field names serialize in camelCase; timestamps keep millisecond precision
//! through a JSON round trip.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::{MessageId, RoomId, Sender, UserId};
use crate::validation;

/// Current wall-clock time truncated to whole milliseconds, the precision
/// persisted timestamps keep.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// The signed-in user. Exactly one per session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub phone_number: String,
    /// Dial code, e.g. `+44`.
    pub country_code: String,
}

impl User {
    pub fn new(phone_number: impl Into<String>, country_code: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            phone_number: phone_number.into(),
            country_code: country_code.into(),
        }
    }

    pub fn display_number(&self) -> String {
        format!("{} {}", self.country_code, self.phone_number)
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single chat message. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    /// Inline image as a `data:` URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Message {
    pub fn user(content: impl Into<String>, image: Option<String>) -> Self {
        Self {
            id: MessageId::new(),
            content: content.into(),
            sender: Sender::User,
            timestamp: now(),
            image,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            content: content.into(),
            sender: Sender::Assistant,
            timestamp: now(),
            image: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// A named conversation with its ordered history.
///
/// `messages` is chronological for messages appended in this session; older
/// pages loaded on demand are spliced in at the front.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// Build an empty room. Fails when the title is blank.
    pub fn new(title: &str) -> Result<Self, ValidationError> {
        let title = validation::room_title(title)?;
        let created = now();
        Ok(Self {
            id: RoomId::new(),
            title,
            messages: Vec::new(),
            created_at: created,
            updated_at: created,
        })
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn contains_message(&self, id: &MessageId) -> bool {
        self.messages.iter().any(|m| &m.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_rejects_blank_title() {
        assert!(matches!(Room::new("   "), Err(ValidationError::EmptyRoomTitle)));
        assert!(matches!(Room::new(""), Err(ValidationError::EmptyRoomTitle)));
    }

    #[test]
    fn test_new_room_is_empty() {
        let room = Room::new("Trip planning").unwrap();
        assert_eq!(room.title, "Trip planning");
        assert!(room.messages.is_empty());
        assert_eq!(room.created_at, room.updated_at);
    }

    #[test]
    fn test_room_json_uses_camel_case() {
        let mut room = Room::new("Notes").unwrap();
        room.messages.push(Message::user("hi", None));
        let json = serde_json::to_value(&room).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert_eq!(json["messages"][0]["sender"], "user");
        assert!(json["messages"][0].get("image").is_none());
    }

    #[test]
    fn test_legacy_room_blob_parses() {
        let raw = r#"{
            "id": "chatroom-1700000000000",
            "title": "Old",
            "messages": [{
                "id": "msg-1700000000001-ai",
                "content": "Hello!",
                "sender": "ai",
                "timestamp": "2023-11-14T22:13:20.001Z"
            }],
            "createdAt": "2023-11-14T22:13:20.000Z",
            "updatedAt": "2023-11-14T22:13:20.001Z"
        }"#;
        let room: Room = serde_json::from_str(raw).unwrap();
        assert_eq!(room.messages[0].sender, Sender::Assistant);
        assert_eq!(room.messages[0].timestamp.timestamp_subsec_millis(), 1);
    }

    #[test]
    fn test_now_has_millisecond_precision() {
        assert_eq!(now().timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn test_user_display_number() {
        let user = User::new("5550100", "+1");
        assert_eq!(user.display_number(), "+1 5550100");
    }
}
