use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use parley_shared::{Room, RoomId};

use crate::client::Client;
use crate::error::{ClientError, Result};
use crate::events::{ClientEvent, NoticeLevel};
use crate::store::ChatAction;

const TITLE_PREVIEW_CHARS: usize = 10;
const MESSAGE_PREVIEW_CHARS: usize = 40;

/// One sidebar entry.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: RoomId,
    pub title: String,
    pub message_count: usize,
    pub last_message: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
    pub is_responding: bool,
}

fn preview(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{cut}...")
}

impl Client {
    /// Create a room, put it at the top of the list and open it.
    pub fn create_room(&self, title: &str) -> Result<RoomId> {
        let mut guard = self.lock()?;
        guard.auth.require_user()?;

        let room = match Room::new(title) {
            Ok(room) => room,
            Err(e) => {
                self.events.notice(NoticeLevel::Error, "Error", e.to_string());
                return Err(e.into());
            }
        };
        let room_id = room.id.clone();
        let room_title = room.title.clone();

        guard.chat.apply(ChatAction::CreateRoom(room));
        guard.persist_rooms();
        drop(guard);

        info!(room = %room_id, title = %room_title, "Chatroom created");
        self.events.emit(ClientEvent::RoomCreated {
            room_id: room_id.clone(),
            title: room_title.clone(),
        });
        self.events.emit(ClientEvent::ActiveRoomChanged {
            room_id: Some(room_id.clone()),
        });
        self.events.notice(
            NoticeLevel::Success,
            "Success",
            format!("Chatroom \"{}\" created", preview(&room_title, TITLE_PREVIEW_CHARS)),
        );
        Ok(room_id)
    }

    /// Delete a room. Unknown ids are a no-op and return `false`.
    pub fn delete_room(&self, room_id: &RoomId) -> Result<bool> {
        let mut guard = self.lock()?;
        guard.auth.require_user()?;

        let title = guard.chat.room(room_id).map(|r| r.title.clone());
        let was_active = guard.chat.active_room_id() == Some(room_id);
        if !guard.chat.delete_room(room_id) {
            return Ok(false);
        }
        guard.pagers.remove(room_id);
        guard.persist_rooms();
        drop(guard);

        info!(room = %room_id, "Chatroom deleted");
        self.events.emit(ClientEvent::RoomDeleted {
            room_id: room_id.clone(),
        });
        if was_active {
            self.events
                .emit(ClientEvent::ActiveRoomChanged { room_id: None });
        }
        self.events.notice(
            NoticeLevel::Warning,
            "Deleted",
            format!("Chatroom \"{}\" deleted", title.unwrap_or_default()),
        );
        Ok(true)
    }

    /// Open a room. Fails if it does not exist.
    pub fn open_room(&self, room_id: &RoomId) -> Result<()> {
        let mut guard = self.lock()?;
        guard.auth.require_user()?;

        if !guard.chat.set_active_room(room_id) {
            return Err(ClientError::RoomNotFound(room_id.clone()));
        }
        drop(guard);

        self.events.emit(ClientEvent::ActiveRoomChanged {
            room_id: Some(room_id.clone()),
        });
        Ok(())
    }

    /// Sidebar entries matching `query` (case-insensitive; blank = all),
    /// newest room first.
    pub fn list_rooms(&self, query: &str) -> Result<Vec<RoomSummary>> {
        let guard = self.lock()?;
        guard.auth.require_user()?;

        let active = guard.chat.active_room_id();
        Ok(guard
            .chat
            .search_rooms(query)
            .into_iter()
            .map(|r| RoomSummary {
                id: r.id.clone(),
                title: r.title.clone(),
                message_count: r.messages.len(),
                last_message: r
                    .last_message()
                    .map(|m| preview(&m.content, MESSAGE_PREVIEW_CHARS)),
                updated_at: r.updated_at,
                is_active: active == Some(&r.id),
                is_responding: guard.chat.is_responding(&r.id),
            })
            .collect())
    }

    /// The open room, if any.
    pub fn active_room(&self) -> Result<Option<Room>> {
        let guard = self.lock()?;
        Ok(guard.chat.active_room().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::signed_in_client;

    #[test]
    fn test_preview_truncates_long_text() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("A very long chatroom title", 10), "A very lon...");
    }

    #[tokio::test]
    async fn test_create_list_and_delete() {
        let (client, store) = signed_in_client();
        let trip = client.create_room("Trip planning").unwrap();
        let food = client.create_room("Groceries").unwrap();

        let rooms = client.list_rooms("").unwrap();
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[0].id, food);
        assert!(rooms[0].is_active);
        assert!(!rooms[1].is_active);

        let hits = client.list_rooms("trip").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, trip);

        assert!(client.delete_room(&food).unwrap());
        assert!(client.active_room().unwrap().is_none());
        assert!(!client.delete_room(&food).unwrap());

        let restored = Client::new(crate::ClientConfig::default(), Box::new(store));
        let rooms = restored.list_rooms("").unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].title, "Trip planning");
    }

    #[tokio::test]
    async fn test_blank_title_is_rejected_with_notice() {
        let (client, _) = signed_in_client();
        let mut events = client.subscribe();

        let err = client.create_room("   ").unwrap_err();
        assert!(err.is_validation());
        assert!(client.list_rooms("").unwrap().is_empty());

        match events.try_recv().unwrap() {
            ClientEvent::Notice(n) => assert_eq!(n.level, NoticeLevel::Error),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_open_unknown_room_fails() {
        let (client, _) = signed_in_client();
        let err = client.open_room(&RoomId::from("ghost")).unwrap_err();
        assert!(matches!(err, ClientError::RoomNotFound(_)));
    }

    #[tokio::test]
    async fn test_rooms_require_sign_in() {
        let client = Client::new(
            crate::ClientConfig::default(),
            Box::new(parley_store::MemoryStore::new()),
        );
        assert!(matches!(
            client.create_room("Trip"),
            Err(ClientError::NotAuthenticated)
        ));
    }
}
