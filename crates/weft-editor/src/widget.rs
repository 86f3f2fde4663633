use crate::config::EditorOption;
use crate::editor::{apply_config, ChangeCallback, TextEditor, TextEditorFactory};
use crate::modes::{mode_for_file_name, mode_for_mime};
use crate::view_model::EditorViewModel;
use std::cell::Cell;
use std::rc::{Rc, Weak};
use weft_core::{BoundSignal, Object, ObjectId, PropertyChangedArgs, Signal, Slot};
use weft_widget::{ResizeMessage, VisualNode, WeakWidget, Widget, WidgetHooks};

pub const EDITOR_CLASS: &str = "w-EditorWidget";

pub const FIXED_HEIGHT_CLASS: &str = "w-mod-fixedHeight";

/// Emitted with the full text after the user edits the document.
pub static CONTENTS_CHANGED: Signal<Widget, String> = Signal::new("contents-changed");

struct EditorState {
    model: EditorViewModel,
    editor: Rc<dyn TextEditor>,
    /// The model text changed while the widget was not visible.
    dirty: Cell<bool>,
}

impl EditorState {
    fn refresh_after_show(&self, widget: &Widget) {
        if self.dirty.get() {
            widget.update(false);
        }
        self.editor.refresh();
    }

    fn update_text(&self, widget: &Widget) {
        if !widget.is_attached() || !widget.is_visible() {
            self.dirty.set(true);
            return;
        }
        widget.update(false);
    }

    fn update_mimetype(&self, mimetype: &str) {
        if let Some(mode) = mode_for_mime(mimetype) {
            self.editor.set_option(EditorOption::Mode(mode.to_string()));
        }
    }

    fn update_filename(&self, filename: &str) {
        if !self.model.mimetype().is_empty() {
            return;
        }
        if let Some(mode) = mode_for_file_name(filename) {
            self.editor.set_option(EditorOption::Mode(mode.to_string()));
        }
    }

    fn on_model_changed(&self, widget: &Widget, args: &PropertyChangedArgs) {
        log::trace!("editor {} model changed: {}", widget.object_id(), args.name());
        match args.name() {
            "fixedHeight" => {
                let fixed = args.new_value::<bool>().copied().unwrap_or(false);
                widget.toggle_class(FIXED_HEIGHT_CLASS, Some(fixed));
            }
            "text" => self.update_text(widget),
            "filename" => {
                if let Some(filename) = args.new_value::<String>() {
                    self.update_filename(filename);
                }
            }
            "mimetype" => {
                if let Some(mimetype) = args.new_value::<String>() {
                    self.update_mimetype(mimetype);
                }
            }
            "lineNumbers" => {
                if let Some(&on) = args.new_value::<bool>() {
                    self.editor.set_option(EditorOption::LineNumbers(on));
                }
            }
            "readOnly" => {
                if let Some(&on) = args.new_value::<bool>() {
                    self.editor.set_option(EditorOption::ReadOnly(on));
                }
            }
            "tabSize" => {
                if let Some(&size) = args.new_value::<u32>() {
                    self.editor.set_option(EditorOption::TabSize(size));
                }
            }
            _ => {}
        }
    }
}

struct EditorHooks {
    state: Rc<EditorState>,
}

impl WidgetHooks for EditorHooks {
    fn on_resize(&self, _widget: &Widget, msg: &ResizeMessage) {
        if msg.is_unknown() {
            self.state.editor.refresh();
        } else {
            self.state.editor.set_size(msg.width, msg.height);
        }
    }

    fn on_update_request(&self, widget: &Widget) {
        if !widget.is_visible() {
            self.state.dirty.set(true);
            return;
        }
        self.state.dirty.set(false);
        let text = self.state.model.text();
        if self.state.editor.value() != text {
            self.state.editor.set_value(&text);
        }
    }

    fn on_after_attach(&self, widget: &Widget) {
        self.state.refresh_after_show(widget);
    }

    fn on_after_show(&self, widget: &Widget) {
        self.state.refresh_after_show(widget);
    }
}

/// A widget hosting a text editor that mirrors an [`EditorViewModel`].
///
/// Model changes become editor options; the model text is pushed into the
/// editor on the next update request while the widget is visible. Edits
/// made in the editor are written back to the model text.
#[derive(Clone)]
pub struct EditorWidget {
    widget: Widget,
    state: Rc<EditorState>,
}

impl EditorWidget {
    pub fn new(factory: &dyn TextEditorFactory, model: EditorViewModel) -> Self {
        let node = VisualNode::new("div");
        let config = model.config();
        let editor = factory.create_instance(&node, &config);
        let state = Rc::new(EditorState {
            model: model.clone(),
            editor,
            dirty: Cell::new(false),
        });
        let widget = Widget::with_node(
            node,
            Rc::new(EditorHooks {
                state: state.clone(),
            }),
        );
        widget.add_class(EDITOR_CLASS);
        widget.toggle_class(FIXED_HEIGHT_CLASS, Some(config.fixed_height));
        apply_config(&*state.editor, &config);
        state.update_text(&widget);

        let on_change: ChangeCallback = {
            let weak_widget = widget.downgrade();
            let model = model.clone();
            Rc::new(move |value: &str| {
                model.set_text(value);
                if let Some(widget) = weak_widget.upgrade() {
                    CONTENTS_CHANGED.bind(&widget).emit(&value.to_string());
                }
            })
        };
        state.editor.on_change(on_change);

        let on_model_changed: Slot<EditorViewModel, PropertyChangedArgs> = {
            let weak_widget: WeakWidget = widget.downgrade();
            let weak_state: Weak<EditorState> = Rc::downgrade(&state);
            Rc::new(move |_: &EditorViewModel, args: &PropertyChangedArgs| {
                if let (Some(widget), Some(state)) = (weak_widget.upgrade(), weak_state.upgrade()) {
                    state.on_model_changed(&widget, args);
                }
            })
        };
        model
            .state_changed()
            .connect_with(&on_model_changed, Some(widget.object_id()));

        log::debug!("created editor {} for {:?}", widget.object_id(), config.filename);
        Self { widget, state }
    }

    pub fn widget(&self) -> &Widget {
        &self.widget
    }

    pub fn model(&self) -> &EditorViewModel {
        &self.state.model
    }

    pub fn editor(&self) -> &Rc<dyn TextEditor> {
        &self.state.editor
    }

    /// Whether model text is waiting to be pushed into the editor.
    pub fn is_dirty(&self) -> bool {
        self.state.dirty.get()
    }

    pub fn contents_changed(&self) -> BoundSignal<'_, Widget, String> {
        CONTENTS_CHANGED.bind(&self.widget)
    }

    pub fn dispose(&self) {
        self.widget.dispose();
    }
}

impl Object for EditorWidget {
    fn object_id(&self) -> ObjectId {
        self.widget.object_id()
    }
}

impl PartialEq for EditorWidget {
    fn eq(&self, other: &Self) -> bool {
        self.widget == other.widget
    }
}

impl std::fmt::Debug for EditorWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorWidget")
            .field("widget", &self.widget)
            .field("model", &self.state.model)
            .finish()
    }
}
