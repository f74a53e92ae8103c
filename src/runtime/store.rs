//! In-memory session storage

use super::traits::{ConversationId, MessageHandle, SessionStore};
use crate::state_machine::SearchState;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Search state of one conversation plus the message it is displayed in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSession {
    pub state: SearchState,
    /// Last probe message; owned by the gateway, only referenced here
    pub probe_ref: Option<MessageHandle>,
}

/// Process-memory session store with no expiry
///
/// The map lock is only held for the lookup or insert itself, never across
/// network I/O, so conversations do not wait on each other.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<ConversationId, SearchSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)] // Diagnostics
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, conversation: ConversationId) -> Option<SearchSession> {
        self.sessions.read().await.get(&conversation).cloned()
    }

    async fn put(&self, conversation: ConversationId, session: SearchSession) {
        self.sessions.write().await.insert(conversation, session);
    }

    async fn delete(&self, conversation: ConversationId) -> bool {
        self.sessions.write().await.remove(&conversation).is_some()
    }
}
