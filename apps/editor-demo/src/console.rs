use std::cell::{Cell, RefCell};
use std::rc::Rc;

use weft_editor::{
    AppShell, ChangeCallback, EditorConfig, EditorOption, TextEditor, TextEditorFactory,
};
use weft_widget::{VisualNode, Widget};

/// A shell with a left panel ordered by rank and a main panel.
pub struct ConsoleShell {
    root: Widget,
    left: Widget,
    main: Widget,
    left_ranks: RefCell<Vec<i32>>,
}

impl ConsoleShell {
    pub fn new() -> anyhow::Result<Self> {
        let root = Widget::new();
        root.set_id("shell");
        let left = Widget::new();
        left.set_id("left-area");
        let main = Widget::new();
        main.set_id("main-area");
        root.set_children(&[left.clone(), main.clone()])?;
        Ok(Self {
            root,
            left,
            main,
            left_ranks: RefCell::new(Vec::new()),
        })
    }

    pub fn root(&self) -> &Widget {
        &self.root
    }
}

impl AppShell for ConsoleShell {
    fn add_to_left_area(&self, widget: &Widget, rank: i32) {
        let mut ranks = self.left_ranks.borrow_mut();
        let index = ranks.partition_point(|existing| *existing <= rank);
        match self.left.insert_child(index, widget) {
            Ok(index) => ranks.insert(index, rank),
            Err(err) => log::warn!("cannot add to left area: {}", err),
        }
    }

    fn add_to_main_area(&self, widget: &Widget) {
        if let Err(err) = self.main.add_child(widget) {
            log::warn!("cannot add to main area: {}", err);
        }
    }
}

/// A text editor that only keeps its buffer.
pub struct BufferEditor {
    wrapper: VisualNode,
    value: RefCell<String>,
    callbacks: RefCell<Vec<ChangeCallback>>,
    size: Cell<Option<(i32, i32)>>,
}

impl TextEditor for BufferEditor {
    fn value(&self) -> String {
        self.value.borrow().clone()
    }

    fn set_value(&self, text: &str) {
        *self.value.borrow_mut() = text.to_string();
        let callbacks = self.callbacks.borrow().clone();
        for callback in callbacks {
            callback(text);
        }
    }

    fn set_option(&self, option: EditorOption) {
        log::debug!("editor option {:?}", option);
    }

    fn on_change(&self, callback: ChangeCallback) {
        self.callbacks.borrow_mut().push(callback);
    }

    fn refresh(&self) {
        log::trace!("editor refresh at {:?}", self.size.get());
    }

    fn set_size(&self, width: i32, height: i32) {
        self.size.set(Some((width, height)));
    }

    fn wrapper_node(&self) -> VisualNode {
        self.wrapper.clone()
    }
}

#[derive(Default)]
pub struct BufferEditorFactory;

impl TextEditorFactory for BufferEditorFactory {
    fn create_instance(&self, host: &VisualNode, config: &EditorConfig) -> Rc<dyn TextEditor> {
        let wrapper = VisualNode::new("pre");
        wrapper.add_class("BufferEditor");
        host.append_child(&wrapper);
        Rc::new(BufferEditor {
            wrapper,
            value: RefCell::new(config.text.clone()),
            callbacks: RefCell::new(Vec::new()),
            size: Cell::new(None),
        })
    }
}
