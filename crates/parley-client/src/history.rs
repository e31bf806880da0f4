//! Older-history pagination.
//!
//! There is no archive to page through; each page is synthesized: a batch of
//! alternating user/assistant lines stamped further in the past than the
//! page before it.  A [`HistoryPager`] tracks one room's progress and gates
//! re-entry while a page is loading.

use chrono::{DateTime, Duration, Utc};
use parley_shared::constants::{HISTORY_MAX_PAGES, HISTORY_PAGE_SIZE, HISTORY_SPACING_SECS};
use parley_shared::replies::{self, HISTORY_ASSISTANT_LINES, HISTORY_USER_LINES};
use parley_shared::{Message, MessageId, Room, Sender};
use rand::Rng;

/// Why a page load was not started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerRejection {
    InFlight,
    Exhausted,
}

/// Grants one page load. Returned by [`HistoryPager::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTicket {
    /// Zero-based page number; page `n` is older than page `n - 1`.
    pub page: u32,
    /// Id offset of the first message in the page.
    pub first_offset: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryPager {
    pages_loaded: u32,
    loading: bool,
    next_offset: u64,
}

impl Default for HistoryPager {
    fn default() -> Self {
        Self {
            pages_loaded: 0,
            loading: false,
            next_offset: HISTORY_PAGE_SIZE as u64,
        }
    }
}

impl HistoryPager {
    /// Pager for a room that may already hold synthesized history (restored
    /// from storage). Offsets resume past the highest id present and pages
    /// already served count against the limit.
    pub fn for_room(room: &Room) -> Self {
        let offsets: Vec<u64> = room
            .messages
            .iter()
            .filter_map(|m| m.id.0.strip_prefix("history-")?.parse::<u64>().ok())
            .collect();
        let mut pager = Self::default();
        if let Some(&h) = offsets.iter().max() {
            pager.next_offset = pager.next_offset.max(h.saturating_add(1));
        }
        let served = offsets.len() / HISTORY_PAGE_SIZE;
        pager.pages_loaded = served.min(HISTORY_MAX_PAGES as usize) as u32;
        pager
    }

    pub fn has_more(&self) -> bool {
        self.pages_loaded < HISTORY_MAX_PAGES
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn pages_loaded(&self) -> u32 {
        self.pages_loaded
    }

    /// Reserve the next page. Fails while another load is in flight or once
    /// every page has been served; state is untouched on failure.
    pub fn begin(&mut self) -> Result<PageTicket, PagerRejection> {
        if self.loading {
            return Err(PagerRejection::InFlight);
        }
        if !self.has_more() {
            return Err(PagerRejection::Exhausted);
        }
        self.loading = true;
        Ok(PageTicket {
            page: self.pages_loaded,
            first_offset: self.next_offset,
        })
    }

    /// Record a delivered page of `count` messages.
    pub fn finish(&mut self, count: usize) {
        self.loading = false;
        self.pages_loaded += 1;
        self.next_offset = self.next_offset.saturating_add(count as u64);
    }

    /// Release the in-flight flag without counting a page.
    pub fn abort(&mut self) {
        self.loading = false;
    }
}

/// Build one page of `count` messages for `ticket`, oldest first.
///
/// Message `i` of page `p` is stamped `(p * count + count - i)` spacing
/// intervals before `now`, so every page sits entirely before the previous
/// one and timestamps increase within the page.
pub fn synthesize_page<R: Rng + ?Sized>(
    ticket: PageTicket,
    count: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<Message> {
    let base = i64::from(ticket.page) * count as i64;
    (0..count)
        .map(|i| {
            let sender = if i % 2 == 0 {
                Sender::User
            } else {
                Sender::Assistant
            };
            let lines = match sender {
                Sender::User => HISTORY_USER_LINES,
                Sender::Assistant => HISTORY_ASSISTANT_LINES,
            };
            let steps_back = base + (count - i) as i64;
            Message {
                id: MessageId::history(ticket.first_offset.saturating_add(i as u64)),
                content: replies::pick(rng, lines).to_string(),
                sender,
                timestamp: now - Duration::seconds(steps_back * HISTORY_SPACING_SECS),
                image: None,
            }
        })
        .collect()
}
