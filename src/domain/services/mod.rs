pub mod editor;
pub mod renderer;

pub use editor::*;
pub use renderer::*;
