//! The widget tree.
//!
//! A [`Widget`] owns its children and one display node. Structural changes
//! are turned into messages sent to the parent; attachment and visibility
//! are tracked as flags kept current by the messages that flow down the
//! tree, never recomputed from scratch:
//!
//! visible == attached && !hidden && (no parent || parent visible)

use crate::error::WidgetError;
use crate::hooks::{DefaultHooks, WidgetHooks};
use crate::message::{ChildMessage, WidgetMessage};
use crate::node::{document_body, VisualNode};
use crate::node_wrapper::NodeWrapper;
use crate::title::Title;
use bitflags::bitflags;
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use weft_core::{
    clear_message_data, clear_property_data, clear_signal_data, post_message, send_message,
    AttachedProperty, BoundSignal, MessageHandler, Object, ObjectId, PropertyOptions, Queue,
    Signal,
};

/// Class carried by every widget node.
pub const WIDGET_CLASS: &str = "w-Widget";

/// Class carried by the node of an explicitly hidden widget.
pub const HIDDEN_CLASS: &str = "w-mod-hidden";

bitflags! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct WidgetFlags: u8 {
        const ATTACHED = 1 << 0;
        const VISIBLE = 1 << 1;
        const DISPOSED = 1 << 2;
    }
}

/// Emitted once when a widget starts disposing.
pub static DISPOSED: Signal<Widget, ()> = Signal::new("disposed");

fn not_hidden(_: &Widget) -> bool {
    false
}

fn new_title(_: &Widget) -> Title {
    Title::new()
}

static HIDDEN: AttachedProperty<Widget, bool> =
    AttachedProperty::new(PropertyOptions::new("hidden", not_hidden).changed(on_hidden_changed));

static TITLE: AttachedProperty<Widget, Title> =
    AttachedProperty::new(PropertyOptions::new("title", new_title));

struct WidgetInner {
    id: ObjectId,
    wrapper: NodeWrapper,
    hooks: Rc<dyn WidgetHooks>,
    flags: Cell<WidgetFlags>,
    parent: RefCell<Weak<WidgetInner>>,
    children: RefCell<SmallVec<[Widget; 4]>>,
}

/// A shared handle to one node of the widget tree.
#[derive(Clone)]
pub struct Widget {
    inner: Rc<WidgetInner>,
}

impl Widget {
    /// A plain `div` widget with the stock behaviour.
    pub fn new() -> Self {
        Self::with_hooks(Rc::new(DefaultHooks))
    }

    pub fn with_hooks(hooks: Rc<dyn WidgetHooks>) -> Self {
        Self::with_node(VisualNode::new("div"), hooks)
    }

    pub fn with_node(node: VisualNode, hooks: Rc<dyn WidgetHooks>) -> Self {
        let wrapper = NodeWrapper::with_node(node);
        wrapper.add_class(WIDGET_CLASS);
        Self {
            inner: Rc::new(WidgetInner {
                id: ObjectId::next(),
                wrapper,
                hooks,
                flags: Cell::new(WidgetFlags::empty()),
                parent: RefCell::new(Weak::new()),
                children: RefCell::new(SmallVec::new()),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakWidget {
        WeakWidget(Rc::downgrade(&self.inner))
    }

    pub fn node(&self) -> &VisualNode {
        self.inner.wrapper.node()
    }

    pub fn wrapper(&self) -> &NodeWrapper {
        &self.inner.wrapper
    }

    pub fn hooks(&self) -> &Rc<dyn WidgetHooks> {
        &self.inner.hooks
    }

    pub fn flags(&self) -> WidgetFlags {
        self.inner.flags.get()
    }

    fn set_flag(&self, flag: WidgetFlags, on: bool) {
        let mut flags = self.inner.flags.get();
        flags.set(flag, on);
        self.inner.flags.set(flags);
    }

    pub fn is_attached(&self) -> bool {
        self.flags().contains(WidgetFlags::ATTACHED)
    }

    pub fn is_visible(&self) -> bool {
        self.flags().contains(WidgetFlags::VISIBLE)
    }

    pub fn is_disposed(&self) -> bool {
        self.flags().contains(WidgetFlags::DISPOSED)
    }

    pub fn is_hidden(&self) -> bool {
        HIDDEN.get(self)
    }

    /// Hide or show the widget. Sends before-hide or after-show when the
    /// change affects visibility, and child-hidden or child-shown to the
    /// parent.
    pub fn set_hidden(&self, hidden: bool) {
        HIDDEN.set(self, hidden);
    }

    /// The widget's title, created on first use.
    pub fn title(&self) -> Title {
        TITLE.get(self)
    }

    pub fn disposed(&self) -> BoundSignal<'_, Widget, ()> {
        DISPOSED.bind(self)
    }

    pub fn id(&self) -> String {
        self.inner.wrapper.id()
    }

    pub fn set_id(&self, id: impl Into<String>) {
        self.inner.wrapper.set_id(id);
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.inner.wrapper.has_class(name)
    }

    pub fn add_class(&self, name: &str) {
        self.inner.wrapper.add_class(name);
    }

    pub fn remove_class(&self, name: &str) {
        self.inner.wrapper.remove_class(name);
    }

    pub fn toggle_class(&self, name: &str, force: Option<bool>) -> bool {
        self.inner.wrapper.toggle_class(name, force)
    }

    pub fn parent(&self) -> Option<Widget> {
        self.inner
            .parent
            .borrow()
            .upgrade()
            .map(|inner| Widget { inner })
    }

    /// Reparent the widget, or remove it from its parent with `None`.
    pub fn set_parent(&self, parent: Option<&Widget>) -> Result<(), WidgetError> {
        let current = self.parent();
        match parent {
            Some(parent) if current.as_ref() != Some(parent) => parent.add_child(self).map(|_| ()),
            None => {
                if let Some(current) = current {
                    current.remove_child(self);
                }
                Ok(())
            }
            Some(_) => Ok(()),
        }
    }

    /// A snapshot of the children.
    pub fn children(&self) -> Vec<Widget> {
        self.inner.children.borrow().to_vec()
    }

    /// Replace all children.
    pub fn set_children(&self, children: &[Widget]) -> Result<(), WidgetError> {
        self.clear_children();
        for child in children {
            self.add_child(child)?;
        }
        Ok(())
    }

    pub fn child_count(&self) -> usize {
        self.inner.children.borrow().len()
    }

    pub fn child_at(&self, index: usize) -> Option<Widget> {
        self.inner.children.borrow().get(index).cloned()
    }

    pub fn child_index(&self, child: &Widget) -> Option<usize> {
        self.inner
            .children
            .borrow()
            .iter()
            .position(|candidate| candidate == child)
    }

    /// Whether this widget is `other` or one of its ancestors.
    pub fn is_ancestor_of(&self, other: &Widget) -> bool {
        let mut cursor = Some(other.clone());
        while let Some(widget) = cursor {
            if &widget == self {
                return true;
            }
            cursor = widget.parent();
        }
        false
    }

    pub fn add_child(&self, child: &Widget) -> Result<usize, WidgetError> {
        self.insert_child(self.child_count(), child)
    }

    /// Insert `child` at `index`, clamped to the child count.
    ///
    /// The child is first removed from its current parent, or detached from
    /// the document if it is an attached root. Returns the index it landed
    /// at.
    pub fn insert_child(&self, index: usize, child: &Widget) -> Result<usize, WidgetError> {
        if child.is_ancestor_of(self) {
            return Err(WidgetError::InvalidChild {
                parent: self.object_id(),
                child: child.object_id(),
            });
        }
        if let Some(old_parent) = child.parent() {
            old_parent.remove_child(child);
        } else if child.is_attached() {
            child.detach()?;
        }

        *child.inner.parent.borrow_mut() = Rc::downgrade(&self.inner);
        let index = {
            let mut children = self.inner.children.borrow_mut();
            let index = index.min(children.len());
            children.insert(index, child.clone());
            index
        };
        log::debug!("{} added child {} at {}", self.object_id(), child.object_id(), index);
        send_message(
            self,
            &WidgetMessage::ChildAdded(ChildMessage::new(child.clone(), None, Some(index))),
        );
        Ok(index)
    }

    /// Move the child at `from` to `to`. Returns `false` if either index is
    /// out of range.
    pub fn move_child(&self, from: usize, to: usize) -> bool {
        let child = {
            let mut children = self.inner.children.borrow_mut();
            if from >= children.len() || to >= children.len() {
                return false;
            }
            if from == to {
                return true;
            }
            let child = children.remove(from);
            children.insert(to, child.clone());
            child
        };
        log::debug!("{} moved child {} from {} to {}", self.object_id(), child.object_id(), from, to);
        send_message(
            self,
            &WidgetMessage::ChildMoved(ChildMessage::new(child, Some(from), Some(to))),
        );
        true
    }

    /// Remove and return the child at `index`.
    pub fn remove_child_at(&self, index: usize) -> Option<Widget> {
        let child = {
            let mut children = self.inner.children.borrow_mut();
            if index >= children.len() {
                return None;
            }
            children.remove(index)
        };
        *child.inner.parent.borrow_mut() = Weak::new();
        log::debug!("{} removed child {} at {}", self.object_id(), child.object_id(), index);
        send_message(
            self,
            &WidgetMessage::ChildRemoved(ChildMessage::new(child.clone(), Some(index), None)),
        );
        Some(child)
    }

    /// Remove `child`, returning the index it had.
    pub fn remove_child(&self, child: &Widget) -> Option<usize> {
        let index = self.child_index(child)?;
        self.remove_child_at(index);
        Some(index)
    }

    /// Remove children from last to first until none remain.
    ///
    /// A hook that adds children in response keeps this running; callers
    /// must not do that.
    pub fn clear_children(&self) {
        while self.child_count() > 0 {
            self.remove_child_at(self.child_count() - 1);
        }
    }

    /// Request an update, posted unless `immediate`.
    pub fn update(&self, immediate: bool) {
        if immediate {
            send_message(self, &WidgetMessage::UpdateRequest);
        } else {
            post_message(self, WidgetMessage::UpdateRequest);
        }
    }

    /// Request that the widget close, posted unless `immediate`.
    pub fn close(&self, immediate: bool) {
        if immediate {
            send_message(self, &WidgetMessage::CloseRequest);
        } else {
            post_message(self, WidgetMessage::CloseRequest);
        }
    }

    /// Append the node of this root widget to `host` and send after-attach.
    ///
    /// Fails without changes if the widget has a parent, is already attached
    /// or in the document, or if `host` is not in the document.
    pub fn attach(&self, host: &VisualNode) -> Result<(), WidgetError> {
        if self.parent().is_some() {
            return Err(WidgetError::RootOnly);
        }
        let body = document_body();
        if self.is_attached() || body.contains(self.node()) {
            return Err(WidgetError::AlreadyAttached(self.object_id()));
        }
        if !body.contains(host) {
            return Err(WidgetError::HostNotAttached);
        }
        log::debug!("attaching {} to {:?}", self.object_id(), host);
        host.append_child(self.node());
        send_message(self, &WidgetMessage::AfterAttach);
        Ok(())
    }

    /// Send before-detach to this root widget and take its node out of the
    /// document.
    pub fn detach(&self) -> Result<(), WidgetError> {
        if self.parent().is_some() {
            return Err(WidgetError::RootOnly);
        }
        if !self.is_attached() || !document_body().contains(self.node()) {
            return Err(WidgetError::NotAttached(self.object_id()));
        }
        log::debug!("detaching {}", self.object_id());
        send_message(self, &WidgetMessage::BeforeDetach);
        self.node().remove();
        Ok(())
    }

    /// Dispose the widget and its whole subtree. Later calls do nothing.
    pub fn dispose(&self) {
        if self.is_disposed() {
            return;
        }
        self.set_flag(WidgetFlags::DISPOSED, true);
        log::debug!("disposing {}", self.object_id());
        self.disposed().emit(&());

        if let Some(parent) = self.parent() {
            parent.remove_child(self);
        } else if self.is_attached() {
            if let Err(err) = self.detach() {
                log::warn!("disposing {}: {}", self.object_id(), err);
            }
        }

        loop {
            let child = self.inner.children.borrow_mut().pop();
            let Some(child) = child else {
                break;
            };
            *child.inner.parent.borrow_mut() = Weak::new();
            child.dispose();
        }

        if let Some(title) = TITLE.peek(self) {
            clear_signal_data(title.object_id());
        }
        clear_signal_data(self.object_id());
        clear_message_data(self.object_id());
        clear_property_data(self.object_id());
    }

    /// The stock message handling: keep the flags current and call the
    /// matching hook.
    pub fn process_default(&self, msg: &WidgetMessage) {
        let hooks = self.inner.hooks.clone();
        match msg {
            WidgetMessage::Resize(resize) => hooks.on_resize(self, resize),
            WidgetMessage::UpdateRequest => hooks.on_update_request(self),
            WidgetMessage::LayoutRequest => hooks.on_layout_request(self),
            WidgetMessage::ChildAdded(child) => hooks.on_child_added(self, child),
            WidgetMessage::ChildRemoved(child) => hooks.on_child_removed(self, child),
            WidgetMessage::ChildMoved(child) => hooks.on_child_moved(self, child),
            WidgetMessage::AfterShow => {
                self.set_flag(WidgetFlags::VISIBLE, true);
                hooks.on_after_show(self);
                send_to_shown(&self.children(), msg);
            }
            WidgetMessage::BeforeHide => {
                hooks.on_before_hide(self);
                send_to_shown(&self.children(), msg);
                self.set_flag(WidgetFlags::VISIBLE, false);
            }
            WidgetMessage::AfterAttach => {
                let visible = !self.is_hidden()
                    && self.parent().map_or(true, |parent| parent.is_visible());
                if visible {
                    self.set_flag(WidgetFlags::VISIBLE, true);
                }
                self.set_flag(WidgetFlags::ATTACHED, true);
                hooks.on_after_attach(self);
                send_to_all(&self.children(), msg);
            }
            WidgetMessage::BeforeDetach => {
                hooks.on_before_detach(self);
                send_to_all(&self.children(), msg);
                self.set_flag(WidgetFlags::VISIBLE | WidgetFlags::ATTACHED, false);
            }
            WidgetMessage::ChildShown(child) => hooks.on_child_shown(self, child),
            WidgetMessage::ChildHidden(child) => hooks.on_child_hidden(self, child),
            WidgetMessage::CloseRequest => hooks.on_close_request(self),
        }
    }

    /// Render the widget subtree with flags, one widget per line.
    pub fn dump(&self) -> String {
        let mut output = String::new();
        self.dump_into(&mut output, 0);
        output
    }

    fn dump_into(&self, output: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        output.push_str(&format!("{}{:?} {:?}", indent, self, self.node()));
        let mut states = Vec::new();
        if self.is_attached() {
            states.push("attached");
        }
        if self.is_visible() {
            states.push("visible");
        }
        if self.is_hidden() {
            states.push("hidden");
        }
        if self.is_disposed() {
            states.push("disposed");
        }
        if !states.is_empty() {
            output.push_str(&format!(" [{}]", states.join(" ")));
        }
        output.push('\n');
        for child in self.children() {
            child.dump_into(output, depth + 1);
        }
    }
}

/// A non-owning handle to a [`Widget`], for callbacks the widget itself
/// keeps alive.
#[derive(Clone, Default)]
pub struct WeakWidget(Weak<WidgetInner>);

impl WeakWidget {
    pub fn upgrade(&self) -> Option<Widget> {
        self.0.upgrade().map(|inner| Widget { inner })
    }
}

impl Default for Widget {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Widget {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Widget {}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Widget{}", self.inner.id)
    }
}

impl Object for Widget {
    fn object_id(&self) -> ObjectId {
        self.inner.id
    }
}

impl MessageHandler for Widget {
    type Message = WidgetMessage;

    fn process_message(&self, msg: &WidgetMessage) {
        let hooks = self.inner.hooks.clone();
        hooks.process_message(self, msg);
    }

    fn compress_message(&self, msg: &WidgetMessage, pending: &Queue<WidgetMessage>) -> bool {
        self.inner.hooks.compress_message(self, msg, pending)
    }
}

/// Send `msg` to every widget in `widgets`.
pub fn send_to_all(widgets: &[Widget], msg: &WidgetMessage) {
    for widget in widgets {
        send_message(widget, msg);
    }
}

/// Send `msg` to every widget in `widgets` that is not explicitly hidden.
pub fn send_to_shown(widgets: &[Widget], msg: &WidgetMessage) {
    for widget in widgets {
        if !widget.is_hidden() {
            send_message(widget, msg);
        }
    }
}

fn on_hidden_changed(owner: &Widget, _old: &bool, hidden: &bool) {
    let affects_visibility =
        owner.is_attached() && owner.parent().map_or(true, |parent| parent.is_visible());
    let parent = owner.parent();
    if *hidden {
        if affects_visibility {
            send_message(owner, &WidgetMessage::BeforeHide);
        }
        owner.add_class(HIDDEN_CLASS);
        if let Some(parent) = parent {
            send_message(
                &parent,
                &WidgetMessage::ChildHidden(ChildMessage::new(owner.clone(), None, None)),
            );
        }
    } else {
        owner.remove_class(HIDDEN_CLASS);
        if affects_visibility {
            send_message(owner, &WidgetMessage::AfterShow);
        }
        if let Some(parent) = parent {
            send_message(
                &parent,
                &WidgetMessage::ChildShown(ChildMessage::new(owner.clone(), None, None)),
            );
        }
    }
}

#[cfg(test)]
#[path = "tests/widget_tests.rs"]
mod tests;
