use crate::message::{ChildMessage, ResizeMessage, WidgetMessage};
use crate::widget::{send_to_all, Widget};
use weft_core::{send_message, Message, Object, Queue};

/// Per-message behaviour of a widget.
///
/// The default bodies are the stock widget behaviour. A custom widget
/// implements this trait, overrides the hooks it cares about and passes
/// itself to [`Widget::with_hooks`]. State flags (attached, visible) are
/// maintained by [`Widget::process_default`] around these calls and cannot
/// be overridden.
pub trait WidgetHooks: 'static {
    /// Entry point for every delivered message. Override to intercept
    /// messages before the stock handling.
    fn process_message(&self, widget: &Widget, msg: &WidgetMessage) {
        widget.process_default(msg);
    }

    fn compress_message(
        &self,
        _widget: &Widget,
        msg: &WidgetMessage,
        pending: &Queue<WidgetMessage>,
    ) -> bool {
        msg.is_compressible() && pending.any(|other| other.kind() == msg.kind())
    }

    fn on_resize(&self, widget: &Widget, _msg: &ResizeMessage) {
        send_to_all(&widget.children(), &WidgetMessage::Resize(ResizeMessage::UNKNOWN_SIZE));
    }

    fn on_update_request(&self, widget: &Widget) {
        send_to_all(&widget.children(), &WidgetMessage::Resize(ResizeMessage::UNKNOWN_SIZE));
    }

    fn on_layout_request(&self, _widget: &Widget) {}

    fn on_child_added(&self, widget: &Widget, msg: &ChildMessage) {
        let next = msg
            .current_index
            .and_then(|index| widget.child_at(index + 1));
        widget
            .node()
            .insert_before(msg.child.node(), next.as_ref().map(Widget::node));
        if widget.is_attached() {
            send_message(&msg.child, &WidgetMessage::AfterAttach);
        }
    }

    fn on_child_removed(&self, widget: &Widget, msg: &ChildMessage) {
        if widget.is_attached() {
            send_message(&msg.child, &WidgetMessage::BeforeDetach);
        }
        widget.node().remove_child(msg.child.node());
    }

    fn on_child_moved(&self, widget: &Widget, msg: &ChildMessage) {
        if widget.is_attached() {
            send_message(&msg.child, &WidgetMessage::BeforeDetach);
        }
        let next = msg
            .current_index
            .and_then(|index| widget.child_at(index + 1));
        widget
            .node()
            .insert_before(msg.child.node(), next.as_ref().map(Widget::node));
        if widget.is_attached() {
            send_message(&msg.child, &WidgetMessage::AfterAttach);
        }
    }

    fn on_after_show(&self, _widget: &Widget) {}

    fn on_before_hide(&self, _widget: &Widget) {}

    fn on_after_attach(&self, _widget: &Widget) {}

    fn on_before_detach(&self, _widget: &Widget) {}

    fn on_child_shown(&self, _widget: &Widget, _msg: &ChildMessage) {}

    fn on_child_hidden(&self, _widget: &Widget, _msg: &ChildMessage) {}

    fn on_close_request(&self, widget: &Widget) {
        if let Some(parent) = widget.parent() {
            parent.remove_child(widget);
        } else if widget.is_attached() {
            if let Err(err) = widget.detach() {
                log::warn!("close request on {}: {}", widget.object_id(), err);
            }
        }
    }
}

/// The stock widget behaviour.
#[derive(Debug, Default)]
pub struct DefaultHooks;

impl WidgetHooks for DefaultHooks {}
