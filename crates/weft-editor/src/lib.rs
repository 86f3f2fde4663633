//! A text editor widget for weft and the pieces around it: a view model of
//! editor settings, a file handler backed by a contents manager and a shell
//! plugin. The text editing component, the contents store and the shell are
//! consumed through traits.

mod config;
mod contents;
mod editor;
mod handler;
pub mod modes;
mod plugin;
mod view_model;
mod widget;

pub use config::{EditorConfig, EditorOption};
pub use contents::{
    base_name, dir_name, ContentsError, ContentsFuture, ContentsManager, ContentsModel,
    ContentsResult,
};
pub use editor::{apply_config, ChangeCallback, TextEditor, TextEditorFactory};
pub use handler::{FileHandler, RevertFuture, FINISHED};
pub use modes::{mode_for_file_name, mode_for_mime};
pub use plugin::{AppShell, EditorPlugin, EDITOR_RANK};
pub use view_model::{EditorViewModel, STATE_CHANGED};
pub use widget::{EditorWidget, CONTENTS_CHANGED, EDITOR_CLASS, FIXED_HEIGHT_CLASS};
