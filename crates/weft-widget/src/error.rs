use weft_core::ObjectId;

/// Contract violations of the widget tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WidgetError {
    #[error("only a root widget can be attached to or detached from the document")]
    RootOnly,
    #[error("widget {0} is already attached to the document")]
    AlreadyAttached(ObjectId),
    #[error("widget {0} is not attached to the document")]
    NotAttached(ObjectId),
    #[error("host node is not attached to the document")]
    HostNotAttached,
    #[error("widget {child} cannot become a child of widget {parent}")]
    InvalidChild { parent: ObjectId, child: ObjectId },
}
