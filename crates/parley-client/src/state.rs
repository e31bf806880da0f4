//! Application state shared by every command.
//!
//! The [`AppState`] struct is wrapped in `Arc<Mutex<>>` and cloned into the
//! background tasks (assistant replies, history loads) so their
//! continuations can re-enter the store once their timers fire.  The lock
//! is never held across an `.await`.

use std::collections::HashMap;

use parley_shared::RoomId;
use parley_store::{KeyValueStore, StateStore};

use crate::auth::AuthState;
use crate::history::HistoryPager;
use crate::store::ChatState;

/// Central application state.
pub struct AppState {
    /// Rooms, messages, active room and pending-reply flags.
    pub chat: ChatState,

    /// Signed-in user and login form progress.
    pub auth: AuthState,

    /// Per-room history pagination progress, created on first use.
    pub pagers: HashMap<RoomId, HistoryPager>,

    /// Backend the user record and room list are written to.
    storage: Box<dyn KeyValueStore + Send>,
}

impl AppState {
    /// Build state from whatever `storage` already holds.
    pub fn restore(storage: Box<dyn KeyValueStore + Send>) -> Self {
        let persisted = storage.load_snapshot();
        tracing::info!(
            rooms = persisted.rooms.len(),
            signed_in = persisted.user.is_some(),
            "restored client state"
        );

        let mut chat = ChatState::new();
        chat.hydrate(persisted.rooms);

        Self {
            chat,
            auth: AuthState::restore(persisted.user),
            pagers: HashMap::new(),
            storage,
        }
    }

    pub fn storage(&self) -> &dyn KeyValueStore {
        self.storage.as_ref()
    }

    /// Pager for `room_id`, seeded from the room's stored history.
    pub fn pager_mut(&mut self, room_id: &RoomId) -> Option<&mut HistoryPager> {
        let room = self.chat.room(room_id)?;
        if !self.pagers.contains_key(room_id) {
            let pager = HistoryPager::for_room(room);
            self.pagers.insert(room_id.clone(), pager);
        }
        self.pagers.get_mut(room_id)
    }

    /// Write the room list. Failures are logged and reported as `false`;
    /// the in-memory state stays authoritative.
    pub fn persist_rooms(&self) -> bool {
        match self.storage.save_rooms(self.chat.rooms()) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "failed to persist rooms");
                false
            }
        }
    }
}
