//! The weft widget tree on top of the core message loop.
//!
//! Widgets own a display node from an in-memory host tree, keep their
//! attached and visible flags current through lifecycle messages, and carry
//! a [`Title`] for containers that show them.

mod error;
mod hooks;
pub mod message;
pub mod node;
mod node_wrapper;
mod title;
mod widget;

pub use error::WidgetError;
pub use hooks::{DefaultHooks, WidgetHooks};
pub use message::{ChildMessage, ResizeMessage, WidgetMessage};
pub use node::{document_body, VisualNode};
pub use node_wrapper::NodeWrapper;
pub use title::{Title, TITLE_CHANGED};
pub use widget::{
    send_to_all, send_to_shown, WeakWidget, Widget, WidgetFlags, DISPOSED, HIDDEN_CLASS,
    WIDGET_CLASS,
};
