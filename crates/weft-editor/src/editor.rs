use crate::config::{EditorConfig, EditorOption};
use std::rc::Rc;
use weft_widget::VisualNode;

/// Called with the full editor text after every edit.
pub type ChangeCallback = Rc<dyn Fn(&str)>;

/// A text editing component living inside a host node.
pub trait TextEditor {
    fn value(&self) -> String;

    /// Replace the whole document.
    fn set_value(&self, text: &str);

    fn set_option(&self, option: EditorOption);

    fn on_change(&self, callback: ChangeCallback);

    /// Re-measure after the host node changed size or became visible.
    fn refresh(&self);

    fn set_size(&self, width: i32, height: i32);

    /// The outermost node the editor created inside its host.
    fn wrapper_node(&self) -> VisualNode;
}

/// Creates text editors inside host nodes.
pub trait TextEditorFactory {
    fn create_instance(&self, host: &VisualNode, config: &EditorConfig) -> Rc<dyn TextEditor>;
}

/// Push every option of `config` to `editor`.
pub fn apply_config(editor: &dyn TextEditor, config: &EditorConfig) {
    if let Some(mode) = config.mode() {
        editor.set_option(EditorOption::Mode(mode.to_string()));
    }
    editor.set_option(EditorOption::LineNumbers(config.line_numbers));
    editor.set_option(EditorOption::TabSize(config.tab_size));
    editor.set_option(EditorOption::ReadOnly(config.read_only));
}
