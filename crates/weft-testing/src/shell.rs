use std::cell::RefCell;
use std::rc::Rc;

use weft_editor::AppShell;
use weft_widget::Widget;

/// An [`AppShell`] that keeps the widgets it was given.
#[derive(Default)]
pub struct RecordingShell {
    left: RefCell<Vec<(i32, Widget)>>,
    main: RefCell<Vec<Widget>>,
}

impl RecordingShell {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Left area widgets ordered by rank, then by insertion.
    pub fn left_area(&self) -> Vec<(i32, Widget)> {
        let mut left = self.left.borrow().clone();
        left.sort_by_key(|(rank, _)| *rank);
        left
    }

    pub fn main_area(&self) -> Vec<Widget> {
        self.main.borrow().clone()
    }
}

impl AppShell for RecordingShell {
    fn add_to_left_area(&self, widget: &Widget, rank: i32) {
        self.left.borrow_mut().push((rank, widget.clone()));
    }

    fn add_to_main_area(&self, widget: &Widget) {
        self.main.borrow_mut().push(widget.clone());
    }
}
