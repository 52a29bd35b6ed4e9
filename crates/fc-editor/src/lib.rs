pub mod changes;
pub mod config;
pub mod editor;
pub mod history;
pub mod notice;
pub mod properties;
pub mod selection;
pub mod shortcuts;

pub use config::EditorConfig;
pub use editor::Editor;
pub use notice::{Notice, NoticeLevel};
