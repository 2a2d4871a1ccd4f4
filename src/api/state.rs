//! Shared application state for HTTP handlers

use std::sync::Arc;

use crate::event_store::EventStore;
use crate::session::{SessionConfig, SessionManager};

pub struct AppState {
    /// The event log
    pub store: Arc<EventStore>,
    /// Mounted scrub sessions
    pub sessions: SessionManager,
}

impl AppState {
    pub fn new(store: Arc<EventStore>, session_config: SessionConfig) -> Self {
        let sessions = SessionManager::new(Arc::clone(&store), session_config);
        Self { store, sessions }
    }

    /// Get the current sequence ID
    pub fn current_sequence_id(&self) -> u64 {
        self.store.next_sequence()
    }
}
