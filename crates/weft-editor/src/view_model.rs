use crate::config::EditorConfig;
use weft_core::{
    clear_property_data, clear_signal_data, AttachedProperty, BoundSignal, Object, ObjectId,
    PropertyChangedArgs, PropertyOptions, Signal,
};

/// Emitted after any view model field changes, with the field name.
pub static STATE_CHANGED: Signal<EditorViewModel, PropertyChangedArgs> =
    Signal::new("state-changed");

fn empty(_: &EditorViewModel) -> String {
    String::new()
}

fn yes(_: &EditorViewModel) -> bool {
    true
}

fn no(_: &EditorViewModel) -> bool {
    false
}

fn four(_: &EditorViewModel) -> u32 {
    4
}

static TEXT: AttachedProperty<EditorViewModel, String> =
    AttachedProperty::new(PropertyOptions::new("text", empty).notify(&STATE_CHANGED));
static MIMETYPE: AttachedProperty<EditorViewModel, String> =
    AttachedProperty::new(PropertyOptions::new("mimetype", empty).notify(&STATE_CHANGED));
static FILENAME: AttachedProperty<EditorViewModel, String> =
    AttachedProperty::new(PropertyOptions::new("filename", empty).notify(&STATE_CHANGED));
static FIXED_HEIGHT: AttachedProperty<EditorViewModel, bool> =
    AttachedProperty::new(PropertyOptions::new("fixedHeight", no).notify(&STATE_CHANGED));
static LINE_NUMBERS: AttachedProperty<EditorViewModel, bool> =
    AttachedProperty::new(PropertyOptions::new("lineNumbers", yes).notify(&STATE_CHANGED));
static READ_ONLY: AttachedProperty<EditorViewModel, bool> =
    AttachedProperty::new(PropertyOptions::new("readOnly", no).notify(&STATE_CHANGED));
static TAB_SIZE: AttachedProperty<EditorViewModel, u32> =
    AttachedProperty::new(PropertyOptions::new("tabSize", four).notify(&STATE_CHANGED));

/// Observable editor state shared between an editor widget and whoever
/// drives it. Handles are cheap clones of one identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorViewModel {
    id: ObjectId,
}

impl EditorViewModel {
    pub fn new() -> Self {
        Self {
            id: ObjectId::next(),
        }
    }

    /// A view model with every field taken from `config`.
    pub fn from_config(config: &EditorConfig) -> Self {
        let model = Self::new();
        model.set_mimetype(config.mimetype.clone());
        model.set_filename(config.filename.clone());
        model.set_fixed_height(config.fixed_height);
        model.set_line_numbers(config.line_numbers);
        model.set_read_only(config.read_only);
        model.set_text(config.text.clone());
        model.set_tab_size(config.tab_size);
        model
    }

    /// The current fields as a config.
    pub fn config(&self) -> EditorConfig {
        EditorConfig {
            text: self.text(),
            mimetype: self.mimetype(),
            filename: self.filename(),
            fixed_height: self.fixed_height(),
            line_numbers: self.line_numbers(),
            read_only: self.read_only(),
            tab_size: self.tab_size(),
        }
    }

    pub fn state_changed(&self) -> BoundSignal<'_, EditorViewModel, PropertyChangedArgs> {
        STATE_CHANGED.bind(self)
    }

    pub fn text(&self) -> String {
        TEXT.get(self)
    }

    pub fn set_text(&self, text: impl Into<String>) {
        TEXT.set(self, text.into());
    }

    pub fn mimetype(&self) -> String {
        MIMETYPE.get(self)
    }

    pub fn set_mimetype(&self, mimetype: impl Into<String>) {
        MIMETYPE.set(self, mimetype.into());
    }

    pub fn filename(&self) -> String {
        FILENAME.get(self)
    }

    pub fn set_filename(&self, filename: impl Into<String>) {
        FILENAME.set(self, filename.into());
    }

    pub fn fixed_height(&self) -> bool {
        FIXED_HEIGHT.get(self)
    }

    pub fn set_fixed_height(&self, fixed_height: bool) {
        FIXED_HEIGHT.set(self, fixed_height);
    }

    pub fn line_numbers(&self) -> bool {
        LINE_NUMBERS.get(self)
    }

    pub fn set_line_numbers(&self, line_numbers: bool) {
        LINE_NUMBERS.set(self, line_numbers);
    }

    pub fn read_only(&self) -> bool {
        READ_ONLY.get(self)
    }

    pub fn set_read_only(&self, read_only: bool) {
        READ_ONLY.set(self, read_only);
    }

    pub fn tab_size(&self) -> u32 {
        TAB_SIZE.get(self)
    }

    pub fn set_tab_size(&self, tab_size: u32) {
        TAB_SIZE.set(self, tab_size);
    }

    /// Drop the stored fields and every connection of this view model.
    pub fn dispose(&self) {
        clear_signal_data(self.id);
        clear_property_data(self.id);
    }
}

impl Default for EditorViewModel {
    fn default() -> Self {
        Self::new()
    }
}

impl Object for EditorViewModel {
    fn object_id(&self) -> ObjectId {
        self.id
    }
}

#[cfg(test)]
#[path = "tests/view_model_tests.rs"]
mod tests;
