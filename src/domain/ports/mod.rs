pub mod editor_session_store;
pub mod template_repository;
