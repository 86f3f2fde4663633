use crate::editor::TextEditorFactory;
use crate::view_model::EditorViewModel;
use crate::widget::EditorWidget;
use std::rc::Rc;
use weft_core::Object;
use weft_widget::Widget;

/// Rank the editor plugin uses in the left area.
pub const EDITOR_RANK: i32 = 10;

/// The application shell widgets are mounted into.
pub trait AppShell {
    /// Add `widget` to the left area; lower ranks come first.
    fn add_to_left_area(&self, widget: &Widget, rank: i32);

    fn add_to_main_area(&self, widget: &Widget);
}

/// Mounts a scratch editor into the shell.
pub struct EditorPlugin {
    shell: Rc<dyn AppShell>,
    factory: Rc<dyn TextEditorFactory>,
}

impl EditorPlugin {
    pub fn new(shell: Rc<dyn AppShell>, factory: Rc<dyn TextEditorFactory>) -> Self {
        Self { shell, factory }
    }

    /// Create an editor for `untitled.txt` and add it to the left area.
    pub fn run(&self) -> EditorWidget {
        let model = EditorViewModel::new();
        let view = EditorWidget::new(&*self.factory, model.clone());
        model.set_filename("untitled.txt");
        self.shell.add_to_left_area(view.widget(), EDITOR_RANK);
        log::info!("editor plugin mounted {}", view.widget().object_id());
        view
    }
}
