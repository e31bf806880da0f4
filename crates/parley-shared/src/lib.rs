//! # parley-shared
//!
//! Types shared by every Parley crate: identifiers, the persisted domain
//! records, form validation, canned assistant text and the bundled country
//! list.

pub mod constants;
pub mod countries;
pub mod error;
pub mod models;
pub mod replies;
pub mod types;
pub mod validation;

pub use error::ValidationError;
pub use models::{Message, Room, User};
pub use types::{MessageId, RoomId, Sender, UserId};
