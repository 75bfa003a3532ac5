use crate::domain::ports::editor_session_store::{EditorSessionStore, SharedEditorState};
use crate::domain::services::EditorState;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

struct Entry {
    state: SharedEditorState,
    last_used: Instant,
}

/// Process-local editor sessions. Lost on restart.
#[derive(Clone)]
pub struct InMemoryEditorSessionStore {
    sessions: Arc<RwLock<HashMap<String, Entry>>>,
}

impl InMemoryEditorSessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryEditorSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EditorSessionStore for InMemoryEditorSessionStore {
    async fn insert(&self, session_id: &str, state: EditorState) -> SharedEditorState {
        let shared = Arc::new(Mutex::new(state));
        let mut sessions = self.sessions.write().await;
        sessions.insert(
            session_id.to_string(),
            Entry {
                state: shared.clone(),
                last_used: Instant::now(),
            },
        );
        shared
    }

    async fn get(&self, session_id: &str) -> Option<SharedEditorState> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(session_id).map(|entry| {
            entry.last_used = Instant::now();
            entry.state.clone()
        })
    }

    async fn remove(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id).is_some()
    }

    async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_used.elapsed() <= max_idle);
        before - sessions.len()
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
