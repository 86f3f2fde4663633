use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use weft_editor::{
    ChangeCallback, ContentsError, ContentsFuture, ContentsManager, ContentsModel, EditorConfig,
    EditorOption, TextEditor, TextEditorFactory,
};
use weft_widget::VisualNode;

/// Class of the node a [`MockTextEditor`] creates in its host.
pub const MOCK_EDITOR_CLASS: &str = "MockEditor";

/// An in-memory text editor that records what it is told.
pub struct MockTextEditor {
    wrapper: VisualNode,
    value: RefCell<String>,
    options: RefCell<Vec<EditorOption>>,
    callbacks: RefCell<Vec<ChangeCallback>>,
    refreshes: Cell<usize>,
    size: Cell<Option<(i32, i32)>>,
}

impl MockTextEditor {
    pub fn new(host: &VisualNode, config: &EditorConfig) -> Self {
        let wrapper = VisualNode::new("div");
        wrapper.add_class(MOCK_EDITOR_CLASS);
        host.append_child(&wrapper);
        Self {
            wrapper,
            value: RefCell::new(config.text.clone()),
            options: RefCell::new(Vec::new()),
            callbacks: RefCell::new(Vec::new()),
            refreshes: Cell::new(0),
            size: Cell::new(None),
        }
    }

    /// Replace the text as a user would and notify change callbacks.
    pub fn type_text(&self, text: &str) {
        *self.value.borrow_mut() = text.to_string();
        let callbacks = self.callbacks.borrow().clone();
        for callback in callbacks {
            callback(text);
        }
    }

    pub fn options(&self) -> Vec<EditorOption> {
        self.options.borrow().clone()
    }

    /// The last value pushed for the option called `name`.
    pub fn option(&self, name: &str) -> Option<EditorOption> {
        self.options
            .borrow()
            .iter()
            .rev()
            .find(|option| option.name() == name)
            .cloned()
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.get()
    }

    pub fn size(&self) -> Option<(i32, i32)> {
        self.size.get()
    }
}

impl TextEditor for MockTextEditor {
    fn value(&self) -> String {
        self.value.borrow().clone()
    }

    fn set_value(&self, text: &str) {
        *self.value.borrow_mut() = text.to_string();
    }

    fn set_option(&self, option: EditorOption) {
        self.options.borrow_mut().push(option);
    }

    fn on_change(&self, callback: ChangeCallback) {
        self.callbacks.borrow_mut().push(callback);
    }

    fn refresh(&self) {
        self.refreshes.set(self.refreshes.get() + 1);
    }

    fn set_size(&self, width: i32, height: i32) {
        self.size.set(Some((width, height)));
    }

    fn wrapper_node(&self) -> VisualNode {
        self.wrapper.clone()
    }
}

/// Creates [`MockTextEditor`]s and keeps them for inspection.
#[derive(Default)]
pub struct MockEditorFactory {
    created: RefCell<Vec<Rc<MockTextEditor>>>,
}

impl MockEditorFactory {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn created(&self) -> Vec<Rc<MockTextEditor>> {
        self.created.borrow().clone()
    }

    /// The most recently created editor.
    pub fn last(&self) -> Option<Rc<MockTextEditor>> {
        self.created.borrow().last().cloned()
    }
}

impl TextEditorFactory for MockEditorFactory {
    fn create_instance(&self, host: &VisualNode, config: &EditorConfig) -> Rc<dyn TextEditor> {
        let editor = Rc::new(MockTextEditor::new(host, config));
        self.created.borrow_mut().push(editor.clone());
        editor
    }
}

/// A contents manager over an in-memory map of paths to text. Every call
/// completes immediately.
#[derive(Default)]
pub struct MemoryContentsManager {
    files: RefCell<BTreeMap<String, String>>,
    calls: RefCell<Vec<String>>,
}

impl MemoryContentsManager {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn with_file(self: Rc<Self>, path: &str, content: &str) -> Rc<Self> {
        self.insert(path, content);
        self
    }

    pub fn insert(&self, path: &str, content: &str) {
        self.files
            .borrow_mut()
            .insert(path.to_string(), content.to_string());
    }

    pub fn content(&self, path: &str) -> Option<String> {
        self.files.borrow().get(path).cloned()
    }

    pub fn paths(&self) -> Vec<String> {
        self.files.borrow().keys().cloned().collect()
    }

    /// Calls made so far, as `get <path>`, `save <path>` and
    /// `rename <old> <new>`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn ready(result: Result<ContentsModel, ContentsError>) -> ContentsFuture {
        Box::pin(std::future::ready(result))
    }
}

impl ContentsManager for MemoryContentsManager {
    fn get(&self, path: &str) -> ContentsFuture {
        self.calls.borrow_mut().push(format!("get {path}"));
        let result = match self.content(path) {
            Some(content) => Ok(ContentsModel::new(path, content)),
            None => Err(ContentsError::NotFound(path.to_string())),
        };
        Self::ready(result)
    }

    fn save(&self, path: &str, content: &str) -> ContentsFuture {
        self.calls.borrow_mut().push(format!("save {path}"));
        self.insert(path, content);
        Self::ready(Ok(ContentsModel::new(path, content)))
    }

    fn rename(&self, old_path: &str, new_path: &str) -> ContentsFuture {
        self.calls
            .borrow_mut()
            .push(format!("rename {old_path} {new_path}"));
        let result = {
            let mut files = self.files.borrow_mut();
            if files.contains_key(new_path) {
                Err(ContentsError::AlreadyExists(new_path.to_string()))
            } else {
                match files.remove(old_path) {
                    Some(content) => {
                        files.insert(new_path.to_string(), content.clone());
                        Ok(ContentsModel::new(new_path, content))
                    }
                    None => Err(ContentsError::NotFound(old_path.to_string())),
                }
            }
        };
        Self::ready(result)
    }
}
