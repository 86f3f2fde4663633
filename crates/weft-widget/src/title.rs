use std::fmt;
use std::rc::Rc;
use weft_core::{BoundSignal, Object, ObjectId, ObservableField, PropertyChangedArgs, Signal};

/// Emitted with the field name whenever a title field changes.
pub static TITLE_CHANGED: Signal<Title, PropertyChangedArgs> = Signal::new("title-changed");

struct TitleInner {
    id: ObjectId,
    text: ObservableField<String>,
    icon: ObservableField<String>,
    class_name: ObservableField<String>,
    closable: ObservableField<bool>,
    editable: ObservableField<bool>,
}

/// Presentation data a container shows for a widget: tab text, icon and
/// flags.
#[derive(Clone)]
pub struct Title {
    inner: Rc<TitleInner>,
}

impl Title {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(TitleInner {
                id: ObjectId::next(),
                text: ObservableField::new("text", String::new()),
                icon: ObservableField::new("icon", String::new()),
                class_name: ObservableField::new("className", String::new()),
                closable: ObservableField::new("closable", false),
                editable: ObservableField::new("editable", false),
            }),
        }
    }

    pub fn changed(&self) -> BoundSignal<'_, Title, PropertyChangedArgs> {
        TITLE_CHANGED.bind(self)
    }

    pub fn text(&self) -> String {
        self.inner.text.get()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        self.inner.text.set_and_notify(self, &TITLE_CHANGED, text.into());
    }

    pub fn icon(&self) -> String {
        self.inner.icon.get()
    }

    pub fn set_icon(&self, icon: impl Into<String>) {
        self.inner.icon.set_and_notify(self, &TITLE_CHANGED, icon.into());
    }

    pub fn class_name(&self) -> String {
        self.inner.class_name.get()
    }

    pub fn set_class_name(&self, class_name: impl Into<String>) {
        self.inner
            .class_name
            .set_and_notify(self, &TITLE_CHANGED, class_name.into());
    }

    pub fn closable(&self) -> bool {
        self.inner.closable.get()
    }

    pub fn set_closable(&self, closable: bool) {
        self.inner.closable.set_and_notify(self, &TITLE_CHANGED, closable);
    }

    pub fn editable(&self) -> bool {
        self.inner.editable.get()
    }

    pub fn set_editable(&self, editable: bool) {
        self.inner.editable.set_and_notify(self, &TITLE_CHANGED, editable);
    }
}

impl Default for Title {
    fn default() -> Self {
        Self::new()
    }
}

impl Object for Title {
    fn object_id(&self) -> ObjectId {
        self.inner.id
    }
}

impl PartialEq for Title {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Title")
            .field("id", &self.inner.id)
            .field("text", &self.inner.text.get())
            .field("closable", &self.inner.closable.get())
            .finish()
    }
}
