use crate::domain::services::EditorState;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Shared handle to one live editing session. Events on a session are
/// serialized by its mutex.
pub type SharedEditorState = Arc<Mutex<EditorState>>;

#[async_trait]
pub trait EditorSessionStore: Send + Sync {
    async fn insert(&self, session_id: &str, state: EditorState) -> SharedEditorState;
    /// Looks up a session and marks it as recently used.
    async fn get(&self, session_id: &str) -> Option<SharedEditorState>;
    async fn remove(&self, session_id: &str) -> bool;
    /// Drops sessions idle for longer than `max_idle`; returns how many.
    async fn evict_idle(&self, max_idle: Duration) -> usize;
    async fn len(&self) -> usize;
}
