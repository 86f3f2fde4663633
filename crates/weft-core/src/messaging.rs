//! Message delivery: synchronous sends, posted messages with compression,
//! message filters and the frame-driven dispatch loop.
//!
//! Each handler gets a dispatcher lazily, stored in a thread-local side
//! table keyed by its [`ObjectId`]. Posting a message enqueues it on the
//! handler's dispatcher and pushes the handler onto the global dispatch
//! queue; the host drains that queue by calling [`run_message_loop`] when
//! the installed [`RuntimeScheduler`](crate::RuntimeScheduler) fires.

use crate::collections::map::HashMap;
use crate::object::{Object, ObjectId};
use crate::platform::schedule_frame;
use crate::queue::Queue;
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

/// A value delivered to a [`MessageHandler`].
pub trait Message: Clone + 'static {
    /// Discriminator used for logging and for compression decisions.
    fn kind(&self) -> &'static str;
}

/// An object that processes messages.
///
/// Handlers are cheap clones of a shared handle; the dispatch queue holds a
/// clone for every pending message.
pub trait MessageHandler: Object + Clone {
    type Message: Message;

    fn process_message(&self, msg: &Self::Message);

    /// Return `true` to drop `msg` because an equivalent message is already
    /// in `pending`. Only called when `pending` is non-empty.
    ///
    /// Must not post to this handler.
    fn compress_message(&self, msg: &Self::Message, pending: &Queue<Self::Message>) -> bool {
        let _ = (msg, pending);
        false
    }
}

/// Intercepts messages before they reach a handler.
pub trait MessageFilter<H: MessageHandler> {
    /// Return `true` to stop delivery of `msg` to `handler`.
    fn filter_message(&self, handler: &H, msg: &H::Message) -> bool;
}

impl<H, F> MessageFilter<H> for F
where
    H: MessageHandler,
    F: Fn(&H, &H::Message) -> bool,
{
    fn filter_message(&self, handler: &H, msg: &H::Message) -> bool {
        self(handler, msg)
    }
}

struct FilterLink<H: MessageHandler> {
    filter: RefCell<Option<Rc<dyn MessageFilter<H>>>>,
    next: RefCell<Option<Rc<FilterLink<H>>>>,
}

struct Dispatcher<H: MessageHandler> {
    messages: RefCell<Queue<H::Message>>,
    filters: RefCell<Option<Rc<FilterLink<H>>>>,
}

impl<H: MessageHandler> Dispatcher<H> {
    fn new() -> Self {
        Self {
            messages: RefCell::new(Queue::new()),
            filters: RefCell::new(None),
        }
    }

    fn is_idle(&self) -> bool {
        self.messages.borrow().is_empty() && self.filters.borrow().is_none()
    }

    fn filter_message(&self, handler: &H, msg: &H::Message) -> bool {
        let mut link = self.filters.borrow().clone();
        while let Some(current) = link {
            // Cloned out so a filter may install or remove filters.
            let filter = current.filter.borrow().clone();
            if let Some(filter) = filter {
                if filter.filter_message(handler, msg) {
                    return true;
                }
            }
            link = current.next.borrow().clone();
        }
        false
    }

    fn install(&self, filter: Rc<dyn MessageFilter<H>>) {
        let next = self.filters.borrow_mut().take();
        *self.filters.borrow_mut() = Some(Rc::new(FilterLink {
            filter: RefCell::new(Some(filter)),
            next: RefCell::new(next),
        }));
    }

    /// Mark every link holding `filter` dead and relink the survivors.
    /// A walk in progress keeps following the old `next` pointers of dead
    /// links, which still lead to the surviving tail.
    fn remove(&self, filter: &Rc<dyn MessageFilter<H>>) {
        let mut link = self.filters.borrow().clone();
        let mut prev: Option<Rc<FilterLink<H>>> = None;
        while let Some(current) = link {
            let matches = current
                .filter
                .borrow()
                .as_ref()
                .is_some_and(|installed| same_filter(installed, filter));
            if matches {
                *current.filter.borrow_mut() = None;
            } else {
                match &prev {
                    None => *self.filters.borrow_mut() = Some(current.clone()),
                    Some(prev) => *prev.next.borrow_mut() = Some(current.clone()),
                }
                prev = Some(current.clone());
            }
            link = current.next.borrow().clone();
        }
        match prev {
            None => *self.filters.borrow_mut() = None,
            Some(prev) => *prev.next.borrow_mut() = None,
        }
    }

    fn clear(&self) {
        let messages = std::mem::take(&mut *self.messages.borrow_mut());
        drop(messages);
        let mut link = self.filters.borrow_mut().take();
        while let Some(current) = link {
            current.filter.borrow_mut().take();
            link = current.next.borrow().clone();
        }
    }
}

/// Type-erased view of a dispatcher for the side table.
trait ErasedDispatcher {
    fn clear(&self);
    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<H: MessageHandler> ErasedDispatcher for Dispatcher<H> {
    fn clear(&self) {
        Dispatcher::clear(self);
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

fn same_filter<H: MessageHandler>(
    a: &Rc<dyn MessageFilter<H>>,
    b: &Rc<dyn MessageFilter<H>>,
) -> bool {
    std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
}

/// An entry of the global dispatch queue: one pending message for one
/// handler.
trait PendingDelivery {
    fn target(&self) -> ObjectId;
    fn deliver(&self);
}

struct Delivery<H>(H);

impl<H: MessageHandler> PendingDelivery for Delivery<H> {
    fn target(&self) -> ObjectId {
        self.0.object_id()
    }

    fn deliver(&self) {
        send_pending_message(&self.0);
    }
}

struct LoopState {
    /// `None` entries are batch sentinels.
    queue: Queue<Option<Rc<dyn PendingDelivery>>>,
    wake_up_scheduled: bool,
}

thread_local! {
    static DISPATCHERS: RefCell<HashMap<ObjectId, Rc<dyn ErasedDispatcher>>> = RefCell::new(HashMap::default());
    static LOOP: RefCell<LoopState> = RefCell::new(LoopState {
        queue: Queue::new(),
        wake_up_scheduled: false,
    });
}

fn lookup<H: MessageHandler>(id: ObjectId) -> Option<Rc<Dispatcher<H>>> {
    let entry = DISPATCHERS.with(|map| map.borrow().get(&id).cloned())?;
    entry.into_any().downcast::<Dispatcher<H>>().ok()
}

fn lookup_or_create<H: MessageHandler>(id: ObjectId) -> Rc<Dispatcher<H>> {
    if let Some(dispatcher) = lookup::<H>(id) {
        return dispatcher;
    }
    let dispatcher = Rc::new(Dispatcher::<H>::new());
    let erased: Rc<dyn ErasedDispatcher> = dispatcher.clone();
    DISPATCHERS.with(|map| map.borrow_mut().insert(id, erased));
    dispatcher
}

/// Deliver `msg` to `handler` immediately, unless a filter stops it.
pub fn send_message<H: MessageHandler>(handler: &H, msg: &H::Message) {
    log::trace!("send {} to {}", msg.kind(), handler.object_id());
    if let Some(dispatcher) = lookup::<H>(handler.object_id()) {
        if dispatcher.filter_message(handler, msg) {
            log::trace!("{} to {} filtered", msg.kind(), handler.object_id());
            return;
        }
    }
    handler.process_message(msg);
}

/// Queue `msg` for delivery on a later frame.
///
/// The handler's [`compress_message`](MessageHandler::compress_message)
/// may drop it in favour of a message already pending.
pub fn post_message<H: MessageHandler>(handler: &H, msg: H::Message) {
    let dispatcher = lookup_or_create::<H>(handler.object_id());
    {
        let pending = dispatcher.messages.borrow();
        if !pending.is_empty() && handler.compress_message(&msg, &pending) {
            log::trace!("{} to {} compressed", msg.kind(), handler.object_id());
            return;
        }
    }
    log::trace!("post {} to {}", msg.kind(), handler.object_id());
    dispatcher.messages.borrow_mut().push(msg);
    let delivery: Rc<dyn PendingDelivery> = Rc::new(Delivery(handler.clone()));
    LOOP.with(|state| state.borrow_mut().queue.push(Some(delivery)));
    wake_up_message_loop();
}

/// Whether `handler` has posted messages awaiting delivery.
pub fn has_pending_messages<H: MessageHandler>(handler: &H) -> bool {
    lookup::<H>(handler.object_id())
        .is_some_and(|dispatcher| !dispatcher.messages.borrow().is_empty())
}

/// Deliver the oldest pending message of `handler` through
/// [`send_message`]. Does nothing if none is pending.
pub fn send_pending_message<H: MessageHandler>(handler: &H) {
    let id = handler.object_id();
    let Some(dispatcher) = lookup::<H>(id) else {
        return;
    };
    let msg = dispatcher.messages.borrow_mut().pop();
    if dispatcher.is_idle() {
        DISPATCHERS.with(|map| {
            let mut map = map.borrow_mut();
            if map.get(&id).is_some_and(|entry| same_dispatcher(entry, &dispatcher)) {
                map.remove(&id);
            }
        });
    }
    if let Some(msg) = msg {
        send_message(handler, &msg);
    }
}

fn same_dispatcher<H: MessageHandler>(
    entry: &Rc<dyn ErasedDispatcher>,
    dispatcher: &Rc<Dispatcher<H>>,
) -> bool {
    std::ptr::eq(Rc::as_ptr(entry) as *const (), Rc::as_ptr(dispatcher) as *const ())
}

/// Install `filter` ahead of every filter already installed on `handler`.
pub fn install_message_filter<H: MessageHandler>(handler: &H, filter: Rc<dyn MessageFilter<H>>) {
    lookup_or_create::<H>(handler.object_id()).install(filter);
}

/// Remove every installation of `filter` from `handler`.
pub fn remove_message_filter<H: MessageHandler>(handler: &H, filter: &Rc<dyn MessageFilter<H>>) {
    if let Some(dispatcher) = lookup::<H>(handler.object_id()) {
        dispatcher.remove(filter);
    }
}

/// Drop the pending messages and filters of `id` and remove it from the
/// dispatch queue.
pub fn clear_message_data(id: ObjectId) {
    let dispatcher = DISPATCHERS.with(|map| map.borrow_mut().remove(&id));
    if let Some(dispatcher) = &dispatcher {
        dispatcher.clear();
    }
    let removed = LOOP.with(|state| {
        let mut state = state.borrow_mut();
        let mut removed = Vec::new();
        state.queue.remove_all_by(|entry| match entry {
            Some(delivery) if delivery.target() == id => {
                removed.push(delivery.clone());
                true
            }
            _ => false,
        });
        removed
    });
    // Handler clones are released outside the borrow.
    drop(removed);
    drop(dispatcher);
}

/// Request a run of the message loop if messages are queued and none is
/// scheduled yet.
pub fn wake_up_message_loop() {
    let request = LOOP.with(|state| {
        let mut state = state.borrow_mut();
        if state.wake_up_scheduled || state.queue.is_empty() {
            false
        } else {
            state.wake_up_scheduled = true;
            true
        }
    });
    if request {
        schedule_frame();
    }
}

/// Whether a run of the message loop has been requested and not yet run.
pub fn is_wake_up_scheduled() -> bool {
    LOOP.with(|state| state.borrow().wake_up_scheduled)
}

/// Number of entries in the dispatch queue, sentinels included.
pub fn dispatch_queue_len() -> usize {
    LOOP.with(|state| state.borrow().queue.len())
}

/// Re-arms the loop if a delivery unwinds.
struct DispatchGuard {
    completed: bool,
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        if !self.completed {
            log::error!("message handler panicked, rescheduling the message loop");
            wake_up_message_loop();
        }
    }
}

/// Process one batch of the dispatch queue: every entry queued before this
/// call gets its oldest pending message delivered. Messages posted during
/// the batch wait for the next run.
///
/// Returns the number of entries processed. If a handler panics, the loop
/// is rescheduled for the rest of the batch before the panic propagates.
pub fn run_message_loop() -> usize {
    let start = LOOP.with(|state| {
        let mut state = state.borrow_mut();
        state.wake_up_scheduled = false;
        if state.queue.is_empty() {
            return false;
        }
        // A sentinel already at the back means the previous run unwound.
        if !matches!(state.queue.back(), Some(None)) {
            state.queue.push(None);
        }
        true
    });
    if !start {
        return 0;
    }
    log::debug!("message loop run, {} queued", dispatch_queue_len());

    let mut processed = 0;
    loop {
        let entry = LOOP.with(|state| state.borrow_mut().queue.pop());
        match entry {
            Some(Some(delivery)) => {
                let mut guard = DispatchGuard { completed: false };
                delivery.deliver();
                guard.completed = true;
                processed += 1;
            }
            Some(None) => {
                wake_up_message_loop();
                break;
            }
            None => break,
        }
    }
    processed
}

#[cfg(test)]
#[path = "tests/messaging_tests.rs"]
mod tests;
