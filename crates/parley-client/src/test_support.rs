//! Shared fixtures for the command tests.

use parley_shared::User;
use parley_store::{MemoryStore, StateStore};

use crate::client::Client;
use crate::config::ClientConfig;

/// A client restored with a signed-in user and no rooms. The returned store
/// shares its data with the client's backend.
pub(crate) fn signed_in_client() -> (Client, MemoryStore) {
    let store = MemoryStore::new();
    store
        .save_user(&User::new("9876543210", "+91"))
        .expect("seed user");
    let client = Client::new(ClientConfig::default(), Box::new(store.clone()));
    (client, store)
}
