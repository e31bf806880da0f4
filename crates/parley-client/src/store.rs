//! Room/message store.
//!
//! [`ChatState`] is a plain value; every mutation goes through
//! [`ChatState::apply`] (or the by-value [`ChatState::reduce`]) with a
//! [`ChatAction`], which keeps transitions testable and lets the caller
//! decide when to persist.  Each `apply` reports whether anything changed.

use std::collections::HashSet;

use parley_shared::models::now;
use parley_shared::{Message, Room, RoomId, ValidationError};

/// Every state transition the store understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatAction {
    /// Replace the room list with rooms restored from storage.
    Hydrate(Vec<Room>),
    /// Insert a room at the front of the list and make it active.
    CreateRoom(Room),
    DeleteRoom(RoomId),
    SetActiveRoom(RoomId),
    AppendMessage { room_id: RoomId, message: Message },
    SetResponding { room_id: RoomId, responding: bool },
    /// Splice older messages in front of a room's history.
    PrependHistory { room_id: RoomId, messages: Vec<Message> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatState {
    rooms: Vec<Room>,
    active_room_id: Option<RoomId>,
    /// Rooms with an assistant reply pending.
    responding: HashSet<RoomId>,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pure transition: old state + action -> new state.
    pub fn reduce(mut self, action: ChatAction) -> Self {
        self.apply(action);
        self
    }

    /// Apply `action` in place. Returns `false` when it was a no-op.
    pub fn apply(&mut self, action: ChatAction) -> bool {
        match action {
            ChatAction::Hydrate(rooms) => {
                self.rooms = dedup_rooms(rooms);
                self.active_room_id = None;
                self.responding.clear();
                true
            }
            ChatAction::CreateRoom(room) => {
                if self.room(&room.id).is_some() {
                    tracing::warn!(room = %room.id, "duplicate room id ignored");
                    return false;
                }
                self.active_room_id = Some(room.id.clone());
                self.rooms.insert(0, room);
                true
            }
            ChatAction::DeleteRoom(room_id) => {
                let before = self.rooms.len();
                self.rooms.retain(|r| r.id != room_id);
                if self.rooms.len() == before {
                    return false;
                }
                self.responding.remove(&room_id);
                if self.active_room_id.as_ref() == Some(&room_id) {
                    self.active_room_id = None;
                }
                true
            }
            ChatAction::SetActiveRoom(room_id) => {
                if self.room(&room_id).is_none() {
                    tracing::debug!(room = %room_id, "ignoring unknown active room");
                    return false;
                }
                self.active_room_id = Some(room_id);
                true
            }
            ChatAction::AppendMessage { room_id, message } => {
                let Some(room) = self.room_mut(&room_id) else {
                    return false;
                };
                if room.contains_message(&message.id) {
                    tracing::warn!(room = %room_id, msg = %message.id, "duplicate message id ignored");
                    return false;
                }
                room.messages.push(message);
                room.updated_at = now();
                true
            }
            ChatAction::SetResponding {
                room_id,
                responding,
            } => {
                if !responding {
                    return self.responding.remove(&room_id);
                }
                if self.room(&room_id).is_none() {
                    return false;
                }
                self.responding.insert(room_id)
            }
            ChatAction::PrependHistory { room_id, messages } => {
                let Some(room) = self.room_mut(&room_id) else {
                    return false;
                };
                if messages.is_empty() {
                    return false;
                }
                room.messages.splice(0..0, messages);
                true
            }
        }
    }

    // ------------------------------------------------------------------
    // Convenience wrappers
    // ------------------------------------------------------------------

    /// Replace everything with rooms restored from storage.
    pub fn hydrate(&mut self, rooms: Vec<Room>) {
        self.apply(ChatAction::Hydrate(rooms));
    }

    /// Validate `title`, insert the room at the front and make it active.
    pub fn create_room(&mut self, title: &str) -> Result<RoomId, ValidationError> {
        let room = Room::new(title)?;
        let id = room.id.clone();
        self.apply(ChatAction::CreateRoom(room));
        Ok(id)
    }

    pub fn delete_room(&mut self, room_id: &RoomId) -> bool {
        self.apply(ChatAction::DeleteRoom(room_id.clone()))
    }

    pub fn set_active_room(&mut self, room_id: &RoomId) -> bool {
        self.apply(ChatAction::SetActiveRoom(room_id.clone()))
    }

    pub fn append_message(&mut self, room_id: &RoomId, message: Message) -> bool {
        self.apply(ChatAction::AppendMessage {
            room_id: room_id.clone(),
            message,
        })
    }

    pub fn set_responding(&mut self, room_id: &RoomId, responding: bool) -> bool {
        self.apply(ChatAction::SetResponding {
            room_id: room_id.clone(),
            responding,
        })
    }

    pub fn prepend_history(&mut self, room_id: &RoomId, messages: Vec<Message>) -> bool {
        self.apply(ChatAction::PrependHistory {
            room_id: room_id.clone(),
            messages,
        })
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.iter().find(|r| &r.id == room_id)
    }

    fn room_mut(&mut self, room_id: &RoomId) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|r| &r.id == room_id)
    }

    pub fn active_room_id(&self) -> Option<&RoomId> {
        self.active_room_id.as_ref()
    }

    pub fn active_room(&self) -> Option<&Room> {
        self.active_room_id.as_ref().and_then(|id| self.room(id))
    }

    pub fn is_responding(&self, room_id: &RoomId) -> bool {
        self.responding.contains(room_id)
    }

    pub fn is_any_responding(&self) -> bool {
        !self.responding.is_empty()
    }

    /// Rooms whose title contains `query`, ignoring case. A blank query
    /// matches everything.
    pub fn search_rooms(&self, query: &str) -> Vec<&Room> {
        let needle = query.trim().to_lowercase();
        self.rooms
            .iter()
            .filter(|r| needle.is_empty() || r.title.to_lowercase().contains(&needle))
            .collect()
    }
}

fn dedup_rooms(rooms: Vec<Room>) -> Vec<Room> {
    let mut seen = HashSet::new();
    rooms
        .into_iter()
        .filter(|r| {
            let fresh = seen.insert(r.id.clone());
            if !fresh {
                tracing::warn!(room = %r.id, "dropping duplicate stored room");
            }
            fresh
        })
        .collect()
}
