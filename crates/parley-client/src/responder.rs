//! Simulated assistant replies.
//!
//! Each user message spawns one task bound to the room the message was sent
//! in.  After the configured delay the task clears that room's responding
//! flag and appends a canned reply there, whatever room is active by then.
//! A room deleted in the meantime simply gets no reply.

use std::time::Duration;

use parley_shared::replies;
use parley_shared::{Message, RoomId};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::client::SharedState;
use crate::events::{ClientEvent, EventBus};

pub(crate) fn spawn_reply(
    state: SharedState,
    events: EventBus,
    room_id: RoomId,
    delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let content = replies::assistant_reply(&mut rand::thread_rng()).to_string();
        deliver_reply(&state, &events, &room_id, Message::assistant(content));
    })
}

fn deliver_reply(state: &SharedState, events: &EventBus, room_id: &RoomId, reply: Message) {
    let mut guard = match state.lock() {
        Ok(g) => g,
        Err(e) => {
            error!(room = %room_id, error = %e, "state lock poisoned, reply dropped");
            return;
        }
    };

    let was_responding = guard.chat.set_responding(room_id, false);

    if guard.chat.room(room_id).is_none() {
        info!(room = %room_id, "room deleted before reply arrived, dropping it");
        return;
    }

    if was_responding {
        events.emit(ClientEvent::RespondingChanged {
            room_id: room_id.clone(),
            responding: false,
        });
    }

    if guard.chat.append_message(room_id, reply.clone()) {
        guard.persist_rooms();
        debug!(room = %room_id, msg = %reply.id, "assistant replied");
        events.emit(ClientEvent::MessageAdded {
            room_id: room_id.clone(),
            message: reply,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use parley_store::MemoryStore;
    use parley_shared::Sender;

    use super::*;
    use crate::state::AppState;

    fn shared_with_room() -> (SharedState, RoomId) {
        let mut state = AppState::restore(Box::new(MemoryStore::new()));
        let room_id = state.chat.create_room("room").unwrap();
        (Arc::new(Mutex::new(state)), room_id)
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_arrives_after_delay() {
        let (state, room_id) = shared_with_room();
        state.lock().unwrap().chat.set_responding(&room_id, true);

        let task = spawn_reply(
            state.clone(),
            EventBus::new(),
            room_id.clone(),
            Duration::from_millis(2500),
        );

        tokio::time::sleep(Duration::from_millis(2499)).await;
        assert!(state.lock().unwrap().chat.is_responding(&room_id));

        task.await.unwrap();
        let guard = state.lock().unwrap();
        assert!(!guard.chat.is_responding(&room_id));
        let messages = &guard.chat.room(&room_id).unwrap().messages;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender, Sender::Assistant);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deleted_room_gets_no_reply() {
        let (state, room_id) = shared_with_room();
        state.lock().unwrap().chat.set_responding(&room_id, true);

        let task = spawn_reply(
            state.clone(),
            EventBus::new(),
            room_id.clone(),
            Duration::from_millis(100),
        );
        state.lock().unwrap().chat.delete_room(&room_id);

        task.await.unwrap();
        let guard = state.lock().unwrap();
        assert!(guard.chat.rooms().is_empty());
        assert!(!guard.chat.is_any_responding());
    }
}
