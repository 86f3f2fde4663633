use crate::widget::Widget;
use weft_core::Message;

/// A new size for a widget. `-1` in either dimension means unknown.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ResizeMessage {
    pub width: i32,
    pub height: i32,
}

impl ResizeMessage {
    pub const UNKNOWN_SIZE: ResizeMessage = ResizeMessage {
        width: -1,
        height: -1,
    };

    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn is_unknown(&self) -> bool {
        self.width < 0 || self.height < 0
    }
}

/// A structural change concerning one child.
#[derive(Clone, Debug, PartialEq)]
pub struct ChildMessage {
    pub child: Widget,
    pub previous_index: Option<usize>,
    pub current_index: Option<usize>,
}

impl ChildMessage {
    pub fn new(child: Widget, previous_index: Option<usize>, current_index: Option<usize>) -> Self {
        Self {
            child,
            previous_index,
            current_index,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum WidgetMessage {
    Resize(ResizeMessage),
    UpdateRequest,
    LayoutRequest,
    CloseRequest,
    ChildAdded(ChildMessage),
    ChildRemoved(ChildMessage),
    ChildMoved(ChildMessage),
    ChildShown(ChildMessage),
    ChildHidden(ChildMessage),
    AfterShow,
    BeforeHide,
    AfterAttach,
    BeforeDetach,
}

impl WidgetMessage {
    /// Messages a widget keeps at most one of in its pending queue.
    pub fn is_compressible(&self) -> bool {
        matches!(
            self,
            WidgetMessage::UpdateRequest | WidgetMessage::LayoutRequest | WidgetMessage::CloseRequest
        )
    }
}

impl Message for WidgetMessage {
    fn kind(&self) -> &'static str {
        match self {
            WidgetMessage::Resize(_) => "resize",
            WidgetMessage::UpdateRequest => "update-request",
            WidgetMessage::LayoutRequest => "layout-request",
            WidgetMessage::CloseRequest => "close-request",
            WidgetMessage::ChildAdded(_) => "child-added",
            WidgetMessage::ChildRemoved(_) => "child-removed",
            WidgetMessage::ChildMoved(_) => "child-moved",
            WidgetMessage::ChildShown(_) => "child-shown",
            WidgetMessage::ChildHidden(_) => "child-hidden",
            WidgetMessage::AfterShow => "after-show",
            WidgetMessage::BeforeHide => "before-hide",
            WidgetMessage::AfterAttach => "after-attach",
            WidgetMessage::BeforeDetach => "before-detach",
        }
    }
}
