use crate::contents::{
    base_name, dir_name, ContentsError, ContentsFuture, ContentsManager, ContentsModel,
};
use crate::editor::TextEditorFactory;
use crate::modes::mode_for_file_name;
use crate::view_model::EditorViewModel;
use crate::widget::EditorWidget;
use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use weft_core::{
    install_message_filter, spawn_local, AttachedProperty, BoundSignal, MessageFilter, Object,
    ObjectId, PropertyChangedArgs, PropertyOptions, Signal, Slot,
};
use weft_widget::{Title, Widget, WidgetMessage};

/// Emitted with the requested model once a widget opened by the handler has
/// been populated.
pub static FINISHED: Signal<FileHandler, ContentsModel> = Signal::new("finished");

fn no_model(_: &Widget) -> Option<ContentsModel> {
    None
}

/// The file a widget was opened for.
static MODEL: AttachedProperty<Widget, Option<ContentsModel>> =
    AttachedProperty::new(PropertyOptions::new("model", no_model));

pub type RevertFuture = Pin<Box<dyn Future<Output = Result<(), ContentsError>>>>;

struct HandlerInner {
    id: ObjectId,
    manager: Rc<dyn ContentsManager>,
    factory: Rc<dyn TextEditorFactory>,
    widgets: RefCell<Vec<EditorWidget>>,
}

/// Opens files as editor widgets and keeps them in sync with a
/// [`ContentsManager`].
///
/// The handler filters the messages of every widget it opens: a close
/// request disposes the widget instead of detaching it. Editing a widget's
/// title text renames its file.
#[derive(Clone)]
pub struct FileHandler {
    inner: Rc<HandlerInner>,
}

impl FileHandler {
    pub fn new(manager: Rc<dyn ContentsManager>, factory: Rc<dyn TextEditorFactory>) -> Self {
        Self {
            inner: Rc::new(HandlerInner {
                id: ObjectId::next(),
                manager,
                factory,
                widgets: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn manager(&self) -> &Rc<dyn ContentsManager> {
        &self.inner.manager
    }

    /// A snapshot of the open widgets.
    pub fn widgets(&self) -> Vec<EditorWidget> {
        self.inner.widgets.borrow().clone()
    }

    pub fn finished(&self) -> BoundSignal<'_, FileHandler, ContentsModel> {
        FINISHED.bind(self)
    }

    /// The file `widget` was opened for.
    pub fn model_of(widget: &Widget) -> Option<ContentsModel> {
        MODEL.get(widget)
    }

    fn find(&self, widget: &Widget) -> Option<EditorWidget> {
        self.inner
            .widgets
            .borrow()
            .iter()
            .find(|editor| editor.widget() == widget)
            .cloned()
    }

    fn find_by_path(&self, path: &str) -> Option<EditorWidget> {
        self.inner
            .widgets
            .borrow()
            .iter()
            .find(|editor| {
                Self::model_of(editor.widget()).is_some_and(|model| model.path == path)
            })
            .cloned()
    }

    /// Open `model.path`, returning the widget already open for that path
    /// if there is one. The content is loaded on the local task pool and
    /// [`finished`](Self::finished) is emitted once it is in place.
    pub fn open(&self, model: &ContentsModel) -> EditorWidget {
        if let Some(editor) = self.find_by_path(&model.path) {
            return editor;
        }
        let editor = self.create_widget(model);
        let widget = editor.widget().clone();
        let title = widget.title();
        title.set_closable(true);

        let on_title_changed: Slot<Title, PropertyChangedArgs> = {
            let weak: Weak<HandlerInner> = Rc::downgrade(&self.inner);
            Rc::new(move |title: &Title, args: &PropertyChangedArgs| {
                if let Some(inner) = weak.upgrade() {
                    FileHandler { inner }.title_changed(title, args);
                }
            })
        };
        title
            .changed()
            .connect_with(&on_title_changed, Some(self.object_id()));

        MODEL.set(&widget, Some(model.clone()));
        self.inner.widgets.borrow_mut().push(editor.clone());
        let filter: Rc<dyn MessageFilter<Widget>> =
            Rc::new(CloseFilter(Rc::downgrade(&self.inner)));
        install_message_filter(&widget, filter);
        log::debug!("opened {} as {}", model.path, widget.object_id());

        let handler = self.clone();
        let requested = model.clone();
        let loading = self.inner.manager.get(&model.path);
        let target = editor.clone();
        spawn_local(async move {
            match loading.await {
                Ok(_) if target.widget().is_disposed() => {
                    log::debug!("{} closed before loading finished", requested.path);
                }
                Ok(contents) => {
                    handler.set_state(&target, &contents);
                    handler.finished().emit(&requested);
                }
                Err(err) => log::warn!("loading {} failed: {}", requested.path, err),
            }
        });
        editor
    }

    /// Write the widget's text to its file. `None` if the handler did not
    /// open `widget`.
    pub fn save(&self, widget: &Widget) -> Option<ContentsFuture> {
        let editor = self.find(widget)?;
        let state = self.get_state(&editor)?;
        log::debug!("saving {}", state.path);
        Some(self.inner.manager.save(&state.path, &state.content))
    }

    /// Reload the widget's text from its file. `None` if the handler did
    /// not open `widget`.
    pub fn revert(&self, widget: &Widget) -> Option<RevertFuture> {
        let editor = self.find(widget)?;
        let model = Self::model_of(widget)?;
        let loading = self.inner.manager.get(&model.path);
        let handler = self.clone();
        Some(Box::pin(async move {
            let contents = loading.await?;
            handler.set_state(&editor, &contents);
            Ok(())
        }))
    }

    /// Dispose `widget` and forget it. Returns `false` if the handler did
    /// not open it.
    pub fn close(&self, widget: &Widget) -> bool {
        let removed = {
            let mut widgets = self.inner.widgets.borrow_mut();
            match widgets.iter().position(|editor| editor.widget() == widget) {
                Some(index) => widgets.remove(index),
                None => return false,
            }
        };
        log::debug!("closing {}", widget.object_id());
        removed.dispose();
        removed.model().dispose();
        true
    }

    /// The path a file at `old_path` gets when its title becomes `title`.
    pub fn new_path(old_path: &str, title: &str) -> String {
        format!("{}{}", dir_name(old_path), title)
    }

    fn create_widget(&self, model: &ContentsModel) -> EditorWidget {
        let view_model = EditorViewModel::new();
        view_model.set_filename(model.name.clone());
        let editor = EditorWidget::new(&*self.inner.factory, view_model);
        editor.widget().title().set_text(base_name(&model.path));
        editor
    }

    fn set_state(&self, editor: &EditorWidget, contents: &ContentsModel) {
        let model = editor.model();
        model.set_text(contents.content.clone());
        model.set_filename(contents.name.clone());
        log::debug!(
            "loaded {} into {} ({:?} mode)",
            contents.path,
            editor.object_id(),
            mode_for_file_name(&contents.name)
        );
    }

    fn get_state(&self, editor: &EditorWidget) -> Option<ContentsModel> {
        let model = Self::model_of(editor.widget())?;
        Some(ContentsModel::new(model.path, editor.model().text()))
    }

    fn title_changed(&self, title: &Title, args: &PropertyChangedArgs) {
        if args.name() != "text" {
            return;
        }
        let Some(editor) = self
            .widgets()
            .into_iter()
            .find(|editor| &editor.widget().title() == title)
        else {
            return;
        };
        let Some(model) = Self::model_of(editor.widget()) else {
            return;
        };
        let Some(text) = args.new_value::<String>() else {
            return;
        };
        let new_path = Self::new_path(&model.path, text);
        if new_path == model.path {
            return;
        }
        log::debug!("renaming {} to {}", model.path, new_path);
        let renaming = self.inner.manager.rename(&model.path, &new_path);
        let widget = editor.widget().clone();
        spawn_local(async move {
            match renaming.await {
                Ok(contents) if !widget.is_disposed() => MODEL.set(&widget, Some(contents)),
                Ok(_) => {}
                Err(err) => log::warn!("renaming {} failed: {}", model.path, err),
            }
        });
    }
}

impl Object for FileHandler {
    fn object_id(&self) -> ObjectId {
        self.inner.id
    }
}

impl MessageFilter<Widget> for FileHandler {
    fn filter_message(&self, widget: &Widget, msg: &WidgetMessage) -> bool {
        match msg {
            WidgetMessage::CloseRequest => self.close(widget),
            _ => false,
        }
    }
}

/// The filter installed on opened widgets. Holds the handler weakly so the
/// widgets do not keep it alive.
struct CloseFilter(Weak<HandlerInner>);

impl MessageFilter<Widget> for CloseFilter {
    fn filter_message(&self, widget: &Widget, msg: &WidgetMessage) -> bool {
        match self.0.upgrade() {
            Some(inner) => FileHandler { inner }.filter_message(widget, msg),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_path_keeps_the_directory() {
        assert_eq!(FileHandler::new_path("docs/a.txt", "b.txt"), "docs/b.txt");
        assert_eq!(FileHandler::new_path("a.txt", "b.md"), "b.md");
    }
}
