//! An in-memory host display tree.
//!
//! [`VisualNode`] mirrors the handful of element operations the widget tree
//! needs: ordered children, an id and a class list. Each thread has one
//! document root, [`document_body`]; a node is connected when that root is
//! among its ancestors.

use indexmap::IndexSet;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

thread_local! {
    static BODY: VisualNode = VisualNode::document("body");
}

/// The connected root of this thread's display tree.
pub fn document_body() -> VisualNode {
    BODY.with(VisualNode::clone)
}

struct NodeInner {
    tag: &'static str,
    is_document: bool,
    id: RefCell<String>,
    classes: RefCell<IndexSet<String>>,
    parent: RefCell<Weak<NodeInner>>,
    children: RefCell<Vec<VisualNode>>,
}

/// A shared handle to one element of the display tree.
#[derive(Clone)]
pub struct VisualNode(Rc<NodeInner>);

impl VisualNode {
    pub fn new(tag: &'static str) -> Self {
        Self::create(tag, false)
    }

    fn document(tag: &'static str) -> Self {
        Self::create(tag, true)
    }

    fn create(tag: &'static str, is_document: bool) -> Self {
        Self(Rc::new(NodeInner {
            tag,
            is_document,
            id: RefCell::new(String::new()),
            classes: RefCell::new(IndexSet::new()),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
        }))
    }

    pub fn tag(&self) -> &'static str {
        self.0.tag
    }

    pub fn id(&self) -> String {
        self.0.id.borrow().clone()
    }

    pub fn set_id(&self, id: impl Into<String>) {
        *self.0.id.borrow_mut() = id.into();
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.0.classes.borrow().contains(name)
    }

    pub fn add_class(&self, name: &str) {
        if !self.has_class(name) {
            self.0.classes.borrow_mut().insert(name.to_owned());
        }
    }

    pub fn remove_class(&self, name: &str) {
        self.0.classes.borrow_mut().shift_remove(name);
    }

    /// Class names in insertion order.
    pub fn class_names(&self) -> Vec<String> {
        self.0.classes.borrow().iter().cloned().collect()
    }

    pub fn parent(&self) -> Option<VisualNode> {
        self.0.parent.borrow().upgrade().map(VisualNode)
    }

    pub fn children(&self) -> Vec<VisualNode> {
        self.0.children.borrow().clone()
    }

    pub fn child_count(&self) -> usize {
        self.0.children.borrow().len()
    }

    pub fn ptr_eq(&self, other: &VisualNode) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Whether `other` is this node or one of its descendants.
    pub fn contains(&self, other: &VisualNode) -> bool {
        let mut cursor = Some(other.clone());
        while let Some(node) = cursor {
            if node.ptr_eq(self) {
                return true;
            }
            cursor = node.parent();
        }
        false
    }

    /// Whether this node is part of the document tree.
    pub fn is_connected(&self) -> bool {
        let mut cursor = Some(self.clone());
        while let Some(node) = cursor {
            if node.0.is_document {
                return true;
            }
            cursor = node.parent();
        }
        false
    }

    pub fn append_child(&self, child: &VisualNode) -> bool {
        self.insert_before(child, None)
    }

    /// Insert `child` before `reference`, or at the end when `reference` is
    /// `None` or not a child of this node. `child` is first removed from
    /// wherever it currently is.
    ///
    /// Returns `false` without changes if `child` is this node or one of its
    /// ancestors.
    pub fn insert_before(&self, child: &VisualNode, reference: Option<&VisualNode>) -> bool {
        if child.contains(self) {
            log::warn!("refusing to insert <{}> into its own subtree", child.tag());
            return false;
        }
        if let Some(old_parent) = child.parent() {
            old_parent.remove_child(child);
        }
        let mut children = self.0.children.borrow_mut();
        let index = reference
            .and_then(|reference| children.iter().position(|node| node.ptr_eq(reference)))
            .unwrap_or(children.len());
        children.insert(index, child.clone());
        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        true
    }

    /// Remove `child` from this node. Returns `false` if it is not a child.
    pub fn remove_child(&self, child: &VisualNode) -> bool {
        let removed = {
            let mut children = self.0.children.borrow_mut();
            match children.iter().position(|node| node.ptr_eq(child)) {
                Some(index) => Some(children.remove(index)),
                None => None,
            }
        };
        match removed {
            Some(node) => {
                *node.0.parent.borrow_mut() = Weak::new();
                true
            }
            None => false,
        }
    }

    /// Remove this node from its parent, if any.
    pub fn remove(&self) -> bool {
        match self.parent() {
            Some(parent) => parent.remove_child(self),
            None => false,
        }
    }

    /// Render the subtree, one node per line.
    pub fn dump(&self) -> String {
        let mut output = String::new();
        self.dump_into(&mut output, 0);
        output
    }

    fn dump_into(&self, output: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        output.push_str(&format!("{}{:?}\n", indent, self));
        for child in self.children() {
            child.dump_into(output, depth + 1);
        }
    }
}

impl PartialEq for VisualNode {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for VisualNode {}

impl fmt::Debug for VisualNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.0.tag)?;
        let id = self.0.id.borrow();
        if !id.is_empty() {
            write!(f, "#{}", id)?;
        }
        for class in self.0.classes.borrow().iter() {
            write!(f, ".{}", class)?;
        }
        write!(f, ">")
    }
}

#[cfg(test)]
#[path = "tests/node_tests.rs"]
mod tests;
