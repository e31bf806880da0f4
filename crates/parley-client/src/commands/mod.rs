//! Client command handlers.
//!
//! Each sub-module adds a group of methods to [`Client`](crate::Client).
//! Commands take the state lock, apply the change, persist, release the lock
//! and only then emit events, so subscribers never observe a half-applied
//! change.

pub mod history;
pub mod messaging;
pub mod rooms;
pub mod session;

pub use history::HistoryPage;
pub use rooms::RoomSummary;
