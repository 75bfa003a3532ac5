pub mod editor_sessions;

pub use editor_sessions::InMemoryEditorSessionStore;
