//! Typed access to the two persisted blobs: the signed-in user and the room
//! list.
//!
//! Reads never fail. A missing key, an unreadable backend or a payload that
//! does not parse all come back as "no prior state" with a warning logged,
//! so a corrupt blob can never keep the client from starting.

use parley_shared::constants::{AUTH_KEY, CHATROOMS_KEY};
use parley_shared::models::{Room, User};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::kv::KeyValueStore;

/// Everything restored at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedState {
    pub user: Option<User>,
    pub rooms: Vec<Room>,
}

/// Persistence operations layered over any [`KeyValueStore`].
pub trait StateStore: KeyValueStore {
    fn load_user(&self) -> Option<User> {
        read_json(self, AUTH_KEY)
    }

    fn save_user(&self, user: &User) -> Result<()> {
        write_json(self, AUTH_KEY, user)
    }

    fn remove_user(&self) -> Result<()> {
        self.remove(AUTH_KEY)
    }

    fn load_rooms(&self) -> Vec<Room> {
        read_json(self, CHATROOMS_KEY).unwrap_or_default()
    }

    fn save_rooms(&self, rooms: &[Room]) -> Result<()> {
        write_json(self, CHATROOMS_KEY, rooms)
    }

    fn load_snapshot(&self) -> PersistedState {
        PersistedState {
            user: self.load_user(),
            rooms: self.load_rooms(),
        }
    }
}

impl<T: KeyValueStore + ?Sized> StateStore for T {}

fn read_json<S, T>(store: &S, key: &str) -> Option<T>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(key, error = %e, "failed to read stored value, treating as empty");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "stored value is malformed, treating as empty");
            None
        }
    }
}

fn write_json<S, T>(store: &S, key: &str, value: &T) -> Result<()>
where
    S: KeyValueStore + ?Sized,
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string(value)?;
    debug!(key, bytes = json.len(), "persisting value");
    store.set(key, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, MemoryStore};
    use parley_shared::models::Message;

    fn sample_rooms() -> Vec<Room> {
        let mut busy = Room::new("Trip planning").unwrap();
        busy.messages.push(Message::user("Hello", None));
        busy.messages.push(Message::assistant("Hi there"));
        busy.messages.push(Message::user(
            "",
            Some("data:image/png;base64,iVBORw0KGgo=".to_string()),
        ));
        let empty = Room::new("Empty").unwrap();
        vec![busy, empty]
    }

    #[test]
    fn test_empty_store_loads_nothing() {
        let store = MemoryStore::new();
        let state = store.load_snapshot();
        assert!(state.user.is_none());
        assert!(state.rooms.is_empty());
    }

    #[test]
    fn test_rooms_round_trip_with_dates() {
        let store = MemoryStore::new();
        let rooms = sample_rooms();
        store.save_rooms(&rooms).unwrap();

        let loaded = store.load_rooms();
        assert_eq!(loaded, rooms);
        for (a, b) in loaded.iter().zip(&rooms) {
            assert_eq!(a.created_at.timestamp_millis(), b.created_at.timestamp_millis());
            assert_eq!(a.updated_at.timestamp_millis(), b.updated_at.timestamp_millis());
        }
        assert!(loaded[1].messages.is_empty());
    }

    #[test]
    fn test_rooms_round_trip_through_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rooms.db");
        let rooms = sample_rooms();

        {
            let db = Database::open_at(&path).unwrap();
            db.save_rooms(&rooms).unwrap();
        }

        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.load_rooms(), rooms);
    }

    #[test]
    fn test_user_save_load_remove() {
        let store = MemoryStore::new();
        let user = User::new("9876543210", "+91");

        store.save_user(&user).unwrap();
        assert_eq!(store.load_user(), Some(user));

        store.remove_user().unwrap();
        assert_eq!(store.load_user(), None);
    }

    #[test]
    fn test_malformed_json_is_treated_as_empty() {
        let store = MemoryStore::new();
        store.set(CHATROOMS_KEY, "{not json").unwrap();
        store.set(AUTH_KEY, "[1, 2, 3]").unwrap();

        let state = store.load_snapshot();
        assert!(state.rooms.is_empty());
        assert!(state.user.is_none());
    }

    #[test]
    fn test_works_through_trait_object() {
        let store: Box<dyn KeyValueStore + Send> = Box::new(MemoryStore::new());
        store.save_rooms(&sample_rooms()).unwrap();
        assert_eq!(store.load_rooms().len(), 2);
    }
}
