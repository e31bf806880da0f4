use serde::Serialize;
use tracing::{debug, info, warn};

use parley_shared::constants::HISTORY_PAGE_SIZE;
use parley_shared::models::now;
use parley_shared::RoomId;

use crate::client::{Client, SharedState};
use crate::error::{ClientError, Result};
use crate::events::ClientEvent;
use crate::history::{self, HistoryPager, PagerRejection};

/// Outcome of one accepted page load.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    pub room_id: RoomId,
    pub count: usize,
    pub has_more: bool,
}

/// A room's in-flight history slot. Dropping it before [`release`] frees
/// the slot without counting a page, so a cancelled load never wedges the
/// room.
///
/// [`release`]: Reservation::release
struct Reservation {
    state: SharedState,
    room_id: RoomId,
    armed: bool,
}

impl Reservation {
    fn new(state: SharedState, room_id: RoomId) -> Self {
        Self {
            state,
            room_id,
            armed: true,
        }
    }

    /// Hand the slot back to the caller, which now holds the state lock.
    fn release(mut self) {
        self.armed = false;
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match self.state.lock() {
            Ok(mut guard) => {
                if let Some(pager) = guard.pagers.get_mut(&self.room_id) {
                    pager.abort();
                }
                debug!(room = %self.room_id, "history load cancelled");
            }
            Err(_) => warn!(room = %self.room_id, "state lock poisoned, history slot not released"),
        }
    }
}

impl Client {
    /// Load one page of older messages into the active room.
    ///
    /// Only one load per room may be in flight, and each room serves at most
    /// five pages.  A room deleted while the page was loading gets nothing.
    pub async fn load_older_messages(&self) -> Result<HistoryPage> {
        let (room_id, ticket) = {
            let mut guard = self.lock()?;
            guard.auth.require_user()?;

            let room_id = guard
                .chat
                .active_room_id()
                .cloned()
                .ok_or(ClientError::NoActiveRoom)?;
            let pager = guard
                .pager_mut(&room_id)
                .ok_or_else(|| ClientError::RoomNotFound(room_id.clone()))?;

            match pager.begin() {
                Ok(ticket) => (room_id, ticket),
                Err(PagerRejection::InFlight) => {
                    return Err(ClientError::HistoryLoadInFlight(room_id))
                }
                Err(PagerRejection::Exhausted) => {
                    return Err(ClientError::HistoryExhausted(room_id))
                }
            }
        };

        let reservation = Reservation::new(self.state.clone(), room_id.clone());

        debug!(room = %room_id, page = ticket.page, "loading older messages");
        tokio::time::sleep(self.config.history_delay).await;

        let mut guard = self.lock()?;
        reservation.release();
        if guard.chat.room(&room_id).is_none() {
            guard.pagers.remove(&room_id);
            info!(room = %room_id, "room deleted while history was loading, dropping page");
            return Err(ClientError::RoomNotFound(room_id));
        }

        let messages =
            history::synthesize_page(ticket, HISTORY_PAGE_SIZE, now(), &mut rand::thread_rng());
        let count = messages.len();
        guard.chat.prepend_history(&room_id, messages);

        let has_more = match guard.pagers.get_mut(&room_id) {
            Some(pager) => {
                pager.finish(count);
                pager.has_more()
            }
            None => false,
        };
        guard.persist_rooms();
        drop(guard);

        info!(room = %room_id, count, has_more, "older messages loaded");
        self.events.emit(ClientEvent::HistoryLoaded {
            room_id: room_id.clone(),
            count,
            has_more,
        });
        Ok(HistoryPage {
            room_id,
            count,
            has_more,
        })
    }

    /// Whether the active room can still page further back.
    pub fn has_more_history(&self) -> Result<bool> {
        let guard = self.lock()?;
        let Some(room) = guard.chat.active_room() else {
            return Ok(false);
        };
        Ok(match guard.pagers.get(&room.id) {
            Some(pager) => pager.has_more() && !pager.is_loading(),
            None => HistoryPager::for_room(room).has_more(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use parley_shared::Sender;

    use super::*;
    use crate::test_support::signed_in_client;

    #[tokio::test(start_paused = true)]
    async fn test_five_pages_then_exhausted() {
        let (client, _) = signed_in_client();
        let room_id = client.create_room("Archive").unwrap();

        for page in 1..=5 {
            let loaded = client.load_older_messages().await.unwrap();
            assert_eq!(loaded.count, 20);
            assert_eq!(loaded.has_more, page < 5);
        }
        assert!(!client.has_more_history().unwrap());

        let before = client.chat().unwrap();
        let err = client.load_older_messages().await.unwrap_err();
        assert!(matches!(err, ClientError::HistoryExhausted(id) if id == room_id));
        assert_eq!(client.chat().unwrap(), before);
        assert_eq!(before.room(&room_id).unwrap().messages.len(), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pages_prepend_before_existing_messages() {
        let (client, _) = signed_in_client();
        let room_id = client.create_room("Ordering").unwrap();
        client.send_message("latest", None).unwrap();

        client.load_older_messages().await.unwrap();

        let chat = client.chat().unwrap();
        let messages = &chat.room(&room_id).unwrap().messages;
        assert_eq!(messages.len(), 21);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[1].sender, Sender::Assistant);
        assert_eq!(messages[20].content, "latest");
        assert!(messages[19].timestamp < messages[20].timestamp);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_load_is_rejected() {
        let (client, _) = signed_in_client();
        let room_id = client.create_room("Busy").unwrap();

        let background = client.clone();
        let first = tokio::spawn(async move { background.load_older_messages().await });
        tokio::task::yield_now().await;

        let err = client.load_older_messages().await.unwrap_err();
        assert!(matches!(err, ClientError::HistoryLoadInFlight(id) if id == room_id));

        let loaded = first.await.unwrap().unwrap();
        assert_eq!(loaded.count, 20);
        assert_eq!(client.chat().unwrap().room(&room_id).unwrap().messages.len(), 20);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deleted_room_drops_page() {
        let (client, _) = signed_in_client();
        let room_id = client.create_room("Doomed").unwrap();

        let background = client.clone();
        let load = tokio::spawn(async move { background.load_older_messages().await });
        tokio::task::yield_now().await;

        client.delete_room(&room_id).unwrap();
        tokio::time::sleep(Duration::from_millis(1001)).await;

        let err = load.await.unwrap().unwrap_err();
        assert!(matches!(err, ClientError::RoomNotFound(_)));
        assert!(client.chat().unwrap().rooms().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_load_frees_the_room() {
        let (client, _) = signed_in_client();
        let room_id = client.create_room("Impatient").unwrap();

        let cancelled =
            tokio::time::timeout(Duration::from_millis(10), client.load_older_messages()).await;
        assert!(cancelled.is_err());
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert!(client.has_more_history().unwrap());
        let loaded = client.load_older_messages().await.unwrap();
        assert_eq!(loaded.count, 20);
        assert!(loaded.has_more);
        assert_eq!(client.chat().unwrap().room(&room_id).unwrap().messages.len(), 20);
    }

    #[tokio::test]
    async fn test_has_more_history_leaves_pagers_alone() {
        let (client, _) = signed_in_client();
        client.create_room("Untouched").unwrap();

        assert!(client.has_more_history().unwrap());
        assert!(client.lock().unwrap().pagers.is_empty());
    }

    #[tokio::test]
    async fn test_load_without_active_room_fails() {
        let (client, _) = signed_in_client();
        assert!(matches!(
            client.load_older_messages().await,
            Err(ClientError::NoActiveRoom)
        ));
    }
}
