use std::sync::{Arc, Mutex, MutexGuard};

use parley_store::{Database, KeyValueStore, MemoryStore};
use tokio::sync::broadcast;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::events::{ClientEvent, EventBus};
use crate::state::AppState;
use crate::store::ChatState;

pub type SharedState = Arc<Mutex<AppState>>;

/// Cloneable handle to a running client. Command methods live in
/// [`crate::commands`], grouped by domain.
#[derive(Clone)]
pub struct Client {
    pub(crate) state: SharedState,
    pub(crate) events: EventBus,
    pub(crate) config: Arc<ClientConfig>,
}

impl Client {
    /// Restore a client from `storage`.
    pub fn new(config: ClientConfig, storage: Box<dyn KeyValueStore + Send>) -> Self {
        Self {
            state: Arc::new(Mutex::new(AppState::restore(storage))),
            events: EventBus::new(),
            config: Arc::new(config),
        }
    }

    /// Open the storage backend `config` asks for and restore from it.
    pub fn open(config: ClientConfig) -> Result<Self> {
        let storage: Box<dyn KeyValueStore + Send> = if config.in_memory {
            tracing::info!("using in-memory storage");
            Box::new(MemoryStore::new())
        } else {
            let db = match &config.data_dir {
                Some(dir) => Database::open_in(dir)?,
                None => Database::new()?,
            };
            tracing::info!(path = ?db.path(), "using database storage");
            Box::new(db)
        };
        Ok(Self::new(config, storage))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Copy of the current room/message state for rendering.
    pub fn chat(&self) -> Result<ChatState> {
        Ok(self.lock()?.chat.clone())
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, AppState>> {
        self.state.lock().map_err(|_| ClientError::LockPoisoned)
    }
}
