//! # parley-store
//!
//! Local persistence for the Parley client.
//!
//! State is kept as JSON documents in a small key-value table backed by
//! SQLite.  [`StateStore`] layers typed user/room accessors over any
//! [`KeyValueStore`], and [`MemoryStore`] provides a process-local backend.

pub mod database;
pub mod kv;
pub mod migrations;
pub mod snapshot;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use kv::{KeyValueStore, MemoryStore};
pub use snapshot::{PersistedState, StateStore};
