use super::*;
use crate::message::ResizeMessage;
use proptest::prelude::*;
use weft_core::{run_message_loop, Message, Slot};

type Log = Rc<RefCell<Vec<String>>>;

struct Recording {
    name: &'static str,
    log: Log,
}

impl WidgetHooks for Recording {
    fn process_message(&self, widget: &Widget, msg: &WidgetMessage) {
        self.log
            .borrow_mut()
            .push(format!("{}:{}", self.name, msg.kind()));
        widget.process_default(msg);
    }
}

fn recorded(name: &'static str, log: &Log) -> Widget {
    Widget::with_hooks(Rc::new(Recording {
        name,
        log: log.clone(),
    }))
}

fn live_host() -> VisualNode {
    let host = VisualNode::new("div");
    document_body().append_child(&host);
    host
}

fn drain() {
    while run_message_loop() > 0 {}
}

fn entries(log: &Log, kind: &str) -> Vec<String> {
    log.borrow()
        .iter()
        .filter(|entry| entry.ends_with(kind))
        .cloned()
        .collect()
}

fn assert_visibility(widget: &Widget) {
    let expected = widget.is_attached()
        && !widget.is_hidden()
        && widget.parent().map_or(true, |parent| parent.is_visible());
    assert_eq!(widget.is_visible(), expected, "{}", widget.dump());
    for child in widget.children() {
        assert_visibility(&child);
    }
}

#[test]
fn new_widget_carries_the_widget_class() {
    let widget = Widget::new();
    assert!(widget.has_class(WIDGET_CLASS));
    assert_eq!(widget.node().tag(), "div");
    assert!(!widget.is_attached());
    assert!(!widget.is_visible());
    assert!(!widget.is_disposed());
}

#[test]
fn hidden_root_attach_reaches_children_without_showing_them() {
    let log: Log = Rc::default();
    let a = recorded("a", &log);
    let b = recorded("b", &log);
    a.add_child(&b).unwrap();
    log.borrow_mut().clear();

    a.set_hidden(true);
    a.attach(&live_host()).unwrap();

    assert_eq!(entries(&log, "after-attach"), vec!["a:after-attach", "b:after-attach"]);
    assert!(entries(&log, "after-show").is_empty());
    assert!(a.is_attached() && b.is_attached());
    assert!(!a.is_visible() && !b.is_visible());
    assert!(a.has_class(HIDDEN_CLASS));
}

#[test]
fn showing_a_hidden_root_shows_its_subtree() {
    let log: Log = Rc::default();
    let a = recorded("a", &log);
    let b = recorded("b", &log);
    a.add_child(&b).unwrap();
    a.set_hidden(true);
    a.attach(&live_host()).unwrap();
    log.borrow_mut().clear();

    a.set_hidden(false);

    assert_eq!(*log.borrow(), vec!["a:after-show", "b:after-show"]);
    assert!(a.is_visible() && b.is_visible());
    assert!(!a.has_class(HIDDEN_CLASS));
}

#[test]
fn hiding_a_child_notifies_its_parent() {
    let log: Log = Rc::default();
    let parent = recorded("p", &log);
    let child = recorded("c", &log);
    parent.add_child(&child).unwrap();
    parent.attach(&live_host()).unwrap();
    log.borrow_mut().clear();

    child.set_hidden(true);
    child.set_hidden(true);
    child.set_hidden(false);

    assert_eq!(
        *log.borrow(),
        vec!["c:before-hide", "p:child-hidden", "c:after-show", "p:child-shown"]
    );
}

#[test]
fn after_show_skips_hidden_children() {
    let log: Log = Rc::default();
    let root = recorded("root", &log);
    let shown = recorded("shown", &log);
    let hidden = recorded("hidden", &log);
    root.add_child(&shown).unwrap();
    root.add_child(&hidden).unwrap();
    hidden.set_hidden(true);
    root.set_hidden(true);
    root.attach(&live_host()).unwrap();
    log.borrow_mut().clear();

    root.set_hidden(false);

    assert_eq!(*log.borrow(), vec!["root:after-show", "shown:after-show"]);
    assert!(!hidden.is_visible());
}

#[test]
fn attach_to_a_disconnected_host_fails_without_changes() {
    let log: Log = Rc::default();
    let widget = recorded("w", &log);
    let host = VisualNode::new("div");

    assert_eq!(widget.attach(&host), Err(WidgetError::HostNotAttached));
    assert_eq!(host.child_count(), 0);
    assert!(widget.node().parent().is_none());
    assert!(!widget.is_attached());
    assert!(log.borrow().is_empty());
}

#[test]
fn attach_and_detach_are_for_roots_only() {
    let parent = Widget::new();
    let child = Widget::new();
    parent.add_child(&child).unwrap();
    let host = live_host();

    assert_eq!(child.attach(&host), Err(WidgetError::RootOnly));
    assert_eq!(child.detach(), Err(WidgetError::RootOnly));

    parent.attach(&host).unwrap();
    assert_eq!(
        parent.attach(&host),
        Err(WidgetError::AlreadyAttached(parent.object_id()))
    );
    parent.detach().unwrap();
    assert_eq!(
        parent.detach(),
        Err(WidgetError::NotAttached(parent.object_id()))
    );
    assert!(!parent.is_attached() && !child.is_attached());
    assert_eq!(host.child_count(), 0);
}

#[test]
fn attach_refuses_a_node_already_in_the_document() {
    let widget = Widget::new();
    let host = live_host();
    host.append_child(widget.node());

    assert_eq!(
        widget.attach(&host),
        Err(WidgetError::AlreadyAttached(widget.object_id()))
    );
}

#[test]
fn insert_child_clamps_and_splices_nodes() {
    let parent = Widget::new();
    let a = Widget::new();
    let b = Widget::new();
    let c = Widget::new();

    assert_eq!(parent.add_child(&a), Ok(0));
    assert_eq!(parent.insert_child(10, &c), Ok(1));
    assert_eq!(parent.insert_child(1, &b), Ok(1));

    assert_eq!(parent.children(), vec![a.clone(), b.clone(), c.clone()]);
    let nodes: Vec<VisualNode> = [&a, &b, &c].iter().map(|w| w.node().clone()).collect();
    assert_eq!(parent.node().children(), nodes);
    assert_eq!(b.parent(), Some(parent.clone()));
}

#[test]
fn insert_child_rejects_self_and_ancestors() {
    let root = Widget::new();
    let child = Widget::new();
    root.add_child(&child).unwrap();

    assert!(matches!(
        root.add_child(&root),
        Err(WidgetError::InvalidChild { .. })
    ));
    assert_eq!(
        child.add_child(&root),
        Err(WidgetError::InvalidChild {
            parent: child.object_id(),
            child: root.object_id(),
        })
    );
    assert_eq!(root.children(), vec![child]);
}

#[test]
fn reparenting_moves_between_parents() {
    let log: Log = Rc::default();
    let first = recorded("first", &log);
    let second = recorded("second", &log);
    let child = Widget::new();
    first.add_child(&child).unwrap();
    log.borrow_mut().clear();

    child.set_parent(Some(&second)).unwrap();

    assert_eq!(*log.borrow(), vec!["first:child-removed", "second:child-added"]);
    assert_eq!(first.child_count(), 0);
    assert_eq!(second.children(), vec![child.clone()]);
    assert_eq!(second.node().children(), vec![child.node().clone()]);

    child.set_parent(None).unwrap();
    assert!(child.parent().is_none());
    assert_eq!(second.node().child_count(), 0);
}

#[test]
fn adding_an_attached_root_detaches_it_first() {
    let log: Log = Rc::default();
    let root = recorded("root", &log);
    let parent = Widget::new();
    let host = live_host();
    root.attach(&host).unwrap();
    log.borrow_mut().clear();

    parent.add_child(&root).unwrap();

    assert_eq!(*log.borrow(), vec!["root:before-detach"]);
    assert_eq!(host.child_count(), 0);
    assert!(!root.is_attached());
}

#[test]
fn move_child_reorders_children_and_nodes() {
    let log: Log = Rc::default();
    let parent = recorded("p", &log);
    let a = Widget::new();
    let b = Widget::new();
    let c = Widget::new();
    parent.set_children(&[a.clone(), b.clone(), c.clone()]).unwrap();
    parent.attach(&live_host()).unwrap();
    log.borrow_mut().clear();

    assert!(parent.move_child(0, 2));
    assert_eq!(parent.children(), vec![b.clone(), c.clone(), a.clone()]);
    let nodes: Vec<VisualNode> = [&b, &c, &a].iter().map(|w| w.node().clone()).collect();
    assert_eq!(parent.node().children(), nodes);
    assert!(a.is_attached() && a.is_visible());

    assert!(parent.move_child(1, 1));
    assert!(!parent.move_child(0, 3));
    assert!(!parent.move_child(5, 0));
    assert_eq!(*log.borrow(), vec!["p:child-moved"]);
}

#[test]
fn remove_child_detaches_and_reports_index() {
    let log: Log = Rc::default();
    let parent = Widget::new();
    let child = recorded("c", &log);
    parent.add_child(&Widget::new()).unwrap();
    parent.add_child(&child).unwrap();
    parent.attach(&live_host()).unwrap();
    log.borrow_mut().clear();

    assert_eq!(parent.remove_child(&child), Some(1));
    assert_eq!(*log.borrow(), vec!["c:before-detach"]);
    assert!(!child.is_attached());
    assert!(child.parent().is_none());
    assert!(child.node().parent().is_none());

    assert_eq!(parent.remove_child(&child), None);
    assert!(parent.remove_child_at(7).is_none());
}

#[test]
fn clear_children_removes_from_the_back() {
    let log: Log = Rc::default();
    let parent = recorded("p", &log);
    let children: Vec<Widget> = (0..3).map(|_| Widget::new()).collect();
    parent.set_children(&children).unwrap();
    log.borrow_mut().clear();

    parent.clear_children();

    assert_eq!(parent.child_count(), 0);
    assert_eq!(parent.node().child_count(), 0);
    assert_eq!(log.borrow().len(), 3);
}

#[test]
fn resize_propagates_an_unknown_size() {
    let log: Log = Rc::default();
    let root = Widget::new();
    let child = recorded("c", &log);
    let grandchild = recorded("g", &log);
    root.add_child(&child).unwrap();
    child.add_child(&grandchild).unwrap();
    log.borrow_mut().clear();

    send_message(&root, &WidgetMessage::Resize(ResizeMessage::new(640, 480)));
    root.update(true);

    assert_eq!(*log.borrow(), vec!["c:resize", "g:resize", "c:resize", "g:resize"]);
}

#[test]
fn posted_update_requests_are_compressed() {
    let log: Log = Rc::default();
    let widget = recorded("w", &log);

    widget.update(false);
    widget.update(false);
    post_message(&widget, WidgetMessage::LayoutRequest);
    post_message(&widget, WidgetMessage::LayoutRequest);
    assert!(log.borrow().is_empty());
    drain();

    assert_eq!(*log.borrow(), vec!["w:update-request", "w:layout-request"]);
}

#[test]
fn resize_messages_are_not_compressed() {
    let log: Log = Rc::default();
    let widget = recorded("w", &log);

    post_message(&widget, WidgetMessage::Resize(ResizeMessage::new(1, 1)));
    post_message(&widget, WidgetMessage::Resize(ResizeMessage::new(2, 2)));
    drain();

    assert_eq!(entries(&log, "resize").len(), 2);
}

#[test]
fn close_request_removes_from_parent_or_detaches() {
    let parent = Widget::new();
    let child = Widget::new();
    parent.add_child(&child).unwrap();
    let host = live_host();
    parent.attach(&host).unwrap();

    child.close(false);
    child.close(false);
    drain();
    assert!(child.parent().is_none());
    assert!(!child.is_attached());

    parent.close(true);
    assert!(!parent.is_attached());
    assert_eq!(host.child_count(), 0);
}

#[test]
fn dispose_is_idempotent() {
    let parent = Widget::new();
    let child = Widget::new();
    let grandchild = Widget::new();
    parent.add_child(&child).unwrap();
    child.add_child(&grandchild).unwrap();
    let host = live_host();
    parent.attach(&host).unwrap();

    let disposed = Rc::new(RefCell::new(Vec::new()));
    let slot: Slot<Widget, ()> = {
        let disposed = disposed.clone();
        Rc::new(move |widget: &Widget, _: &()| disposed.borrow_mut().push(widget.clone()))
    };
    for widget in [&parent, &child, &grandchild] {
        widget.disposed().connect(&slot);
    }

    parent.dispose();
    parent.dispose();
    child.dispose();

    assert_eq!(*disposed.borrow(), vec![parent.clone(), child.clone(), grandchild.clone()]);
    assert!(parent.is_disposed() && child.is_disposed() && grandchild.is_disposed());
    assert_eq!(parent.child_count(), 0);
    assert!(child.parent().is_none());
    assert_eq!(host.child_count(), 0);
    assert!(!parent.is_attached());
}

#[test]
fn disposing_a_child_removes_it_from_its_parent() {
    let parent = Widget::new();
    let child = Widget::new();
    parent.add_child(&child).unwrap();

    child.dispose();

    assert_eq!(parent.child_count(), 0);
    assert_eq!(parent.node().child_count(), 0);
}

#[test]
fn dispose_drops_pending_messages_and_title_connections() {
    let log: Log = Rc::default();
    let widget = recorded("w", &log);
    let title = widget.title();
    let seen = Rc::new(RefCell::new(0));
    let slot: Slot<Title, weft_core::PropertyChangedArgs> = {
        let seen = seen.clone();
        Rc::new(move |_: &Title, _: &weft_core::PropertyChangedArgs| *seen.borrow_mut() += 1)
    };
    title.changed().connect(&slot);
    widget.update(false);

    widget.dispose();
    drain();
    title.set_text("gone");

    assert!(log.borrow().is_empty());
    assert_eq!(*seen.borrow(), 0);
}

#[test]
fn title_is_created_once_per_widget() {
    let widget = Widget::new();
    widget.title().set_text("notes.txt");
    assert_eq!(widget.title(), widget.title());
    assert_eq!(widget.title().text(), "notes.txt");
    assert_ne!(Widget::new().title(), widget.title());
}

#[test]
fn dump_lists_flags_per_widget() {
    let root = Widget::new();
    let child = Widget::new();
    root.add_child(&child).unwrap();
    child.set_hidden(true);
    root.attach(&live_host()).unwrap();

    let dump = root.dump();
    let lines: Vec<&str> = dump.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("[attached visible]"));
    assert!(lines[1].starts_with("  "));
    assert!(lines[1].ends_with("[attached hidden]"));
}

#[derive(Clone, Debug)]
enum TreeOp {
    Attach(usize),
    Detach(usize),
    Hide(usize),
    Show(usize),
    Reparent(usize, usize),
    Unparent(usize),
}

fn tree_op() -> impl Strategy<Value = TreeOp> {
    prop_oneof![
        (0..5usize).prop_map(TreeOp::Attach),
        (0..5usize).prop_map(TreeOp::Detach),
        (0..5usize).prop_map(TreeOp::Hide),
        (0..5usize).prop_map(TreeOp::Show),
        (0..5usize, 0..5usize).prop_map(|(a, b)| TreeOp::Reparent(a, b)),
        (0..5usize).prop_map(TreeOp::Unparent),
    ]
}

proptest! {
    #[test]
    fn visibility_tracks_attachment_hiding_and_parents(ops in prop::collection::vec(tree_op(), 1..40)) {
        let host = live_host();
        let widgets: Vec<Widget> = (0..5).map(|_| Widget::new()).collect();
        for op in ops {
            match op {
                TreeOp::Attach(i) => {
                    let _ = widgets[i].attach(&host);
                }
                TreeOp::Detach(i) => {
                    let _ = widgets[i].detach();
                }
                TreeOp::Hide(i) => widgets[i].set_hidden(true),
                TreeOp::Show(i) => widgets[i].set_hidden(false),
                TreeOp::Reparent(child, parent) => {
                    let _ = widgets[parent].add_child(&widgets[child]);
                }
                TreeOp::Unparent(i) => {
                    let _ = widgets[i].set_parent(None);
                }
            }
            for widget in &widgets {
                assert_visibility(widget);
            }
        }
        for widget in &widgets {
            widget.dispose();
        }
    }
}
