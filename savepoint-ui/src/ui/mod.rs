mod backend;
pub mod editor;
pub mod status_bar;

pub use backend::{KeyInput, RatatuiBackend};
pub use editor::Editor;
pub use status_bar::StatusBar;
