use std::path::Path;

use tracing::info;

use parley_shared::{validation, Message, MessageId};

use crate::attachment;
use crate::client::Client;
use crate::error::{ClientError, Result};
use crate::events::{ClientEvent, NoticeLevel};
use crate::responder;

impl Client {
    /// Send a message to the active room and schedule the assistant reply.
    ///
    /// Rejected while the room is still waiting on a previous reply.  The
    /// reply task is bound to this room: switching rooms afterwards does not
    /// move it.
    pub fn send_message(&self, content: &str, image: Option<String>) -> Result<MessageId> {
        let mut guard = self.lock()?;
        guard.auth.require_user()?;

        let room_id = guard
            .chat
            .active_room_id()
            .cloned()
            .ok_or(ClientError::NoActiveRoom)?;

        if let Err(e) = validation::message(content, image.is_some()) {
            self.events.notice(NoticeLevel::Error, "Error", e.to_string());
            return Err(e.into());
        }
        if guard.chat.is_responding(&room_id) {
            return Err(ClientError::AlreadyResponding(room_id));
        }

        let message = Message::user(content.trim(), image);
        let message_id = message.id.clone();
        guard.chat.append_message(&room_id, message.clone());
        guard.chat.set_responding(&room_id, true);
        guard.persist_rooms();
        drop(guard);

        info!(room = %room_id, msg = %message_id, "message sent");
        self.events.emit(ClientEvent::MessageAdded {
            room_id: room_id.clone(),
            message,
        });
        self.events.emit(ClientEvent::RespondingChanged {
            room_id: room_id.clone(),
            responding: true,
        });
        self.events
            .notice(NoticeLevel::Info, "Message sent", "Waiting for a reply...");

        responder::spawn_reply(
            self.state.clone(),
            self.events.clone(),
            room_id,
            self.config.response_delay,
        );
        Ok(message_id)
    }

    /// Attach the image at `path` and send it with an optional caption.
    pub async fn send_image(&self, path: &Path, caption: &str) -> Result<MessageId> {
        let data_uri = match attachment::load_image(path).await {
            Ok(uri) => uri,
            Err(e) => {
                if e.is_validation() {
                    self.events.notice(NoticeLevel::Error, "Error", e.to_string());
                }
                return Err(e);
            }
        };
        self.send_message(caption, Some(data_uri))
    }
}
