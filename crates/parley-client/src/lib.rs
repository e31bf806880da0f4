//! # parley-client
//!
//! Chat client core: the room/message store, simulated assistant replies,
//! older-history paging, the phone/OTP sign-in flow and persistence wiring.
//! Front ends drive it through [`Client`] and render from the
//! [`ClientEvent`] stream.

pub mod attachment;
pub mod auth;
pub mod client;
pub mod commands;
pub mod config;
pub mod countries;
pub mod error;
pub mod events;
pub mod history;
pub mod state;
pub mod store;

mod responder;

#[cfg(test)]
mod test_support;

use tracing_subscriber::{fmt, EnvFilter};

pub use auth::LoginStep;
pub use client::Client;
pub use commands::{HistoryPage, RoomSummary};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use events::{ClientEvent, EventBus, Notice, NoticeLevel};
pub use store::{ChatAction, ChatState};

/// Install the global `tracing` subscriber. Honors `RUST_LOG`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("parley_client=info,parley_store=info,warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
