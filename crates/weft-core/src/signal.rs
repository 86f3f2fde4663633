//! Type-safe publish/subscribe between objects.
//!
//! A [`Signal`] is a stateless descriptor, normally declared as a `static`.
//! Binding it to a sender produces a [`BoundSignal`] through which slots are
//! connected, disconnected and invoked. All connection state lives in a
//! thread-local registry keyed by [`ObjectId`].
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use weft_core::{Object, ObjectId, Signal, Slot};
//!
//! struct Counter {
//!     id: ObjectId,
//! }
//!
//! impl Object for Counter {
//!     fn object_id(&self) -> ObjectId {
//!         self.id
//!     }
//! }
//!
//! static VALUE_CHANGED: Signal<Counter, i32> = Signal::new("value-changed");
//!
//! let counter = Counter { id: ObjectId::next() };
//! let seen = Rc::new(Cell::new(0));
//! let slot: Slot<Counter, i32> = {
//!     let seen = seen.clone();
//!     Rc::new(move |_sender: &Counter, value: &i32| seen.set(*value))
//! };
//! assert!(VALUE_CHANGED.bind(&counter).connect(&slot));
//! VALUE_CHANGED.bind(&counter).emit(&42);
//! assert_eq!(seen.get(), 42);
//! ```

use crate::collections::map::HashMap;
use crate::object::{Object, ObjectId};
use slab::Slab;
use std::any::Any;
use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

/// A connected callback. Identity is the `Rc` allocation.
pub type Slot<S, T> = Rc<dyn Fn(&S, &T)>;

type ErasedSlot = Rc<dyn Fn(&dyn Any, &dyn Any)>;
type ConnKey = usize;

static NEXT_SIGNAL_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SignalId(u64);

/// A signal descriptor carrying payloads of type `T` from senders of type `S`.
pub struct Signal<S, T> {
    name: &'static str,
    id: OnceLock<SignalId>,
    _marker: PhantomData<fn(&S, &T)>,
}

impl<S: Object, T: 'static> Signal<S, T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            id: OnceLock::new(),
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn id(&self) -> SignalId {
        *self
            .id
            .get_or_init(|| SignalId(NEXT_SIGNAL_ID.fetch_add(1, Ordering::Relaxed)))
    }

    /// Bind the signal to a specific sender.
    pub fn bind<'a>(&'a self, sender: &'a S) -> BoundSignal<'a, S, T> {
        BoundSignal {
            signal: self,
            sender,
        }
    }
}

/// A signal bound to one sender.
pub struct BoundSignal<'a, S, T> {
    signal: &'a Signal<S, T>,
    sender: &'a S,
}

impl<'a, S: Object, T: 'static> BoundSignal<'a, S, T> {
    /// Connect a slot. The slot itself acts as the receiver.
    ///
    /// Returns `false` if an identical live connection already exists.
    pub fn connect(&self, slot: &Slot<S, T>) -> bool {
        self.connect_with(slot, None)
    }

    /// Connect a slot on behalf of `receiver`, so that
    /// [`disconnect_receiver`] on that object tears the connection down.
    pub fn connect_with(&self, slot: &Slot<S, T>, receiver: Option<ObjectId>) -> bool {
        let receiver = Receiver::resolve(slot, receiver);
        let typed = Rc::clone(slot);
        let invoke: ErasedSlot = Rc::new(move |sender: &dyn Any, args: &dyn Any| {
            if let (Some(sender), Some(args)) = (sender.downcast_ref::<S>(), args.downcast_ref::<T>())
            {
                typed(sender, args);
            }
        });
        REGISTRY.with(|registry| {
            registry.borrow_mut().connect(
                self.sender.object_id(),
                self.signal.id(),
                slot_key(slot),
                receiver,
                invoke,
            )
        })
    }

    pub fn disconnect(&self, slot: &Slot<S, T>) -> bool {
        self.disconnect_with(slot, None)
    }

    /// Disconnect a slot previously connected with [`connect_with`](Self::connect_with).
    ///
    /// Returns `false` if no such connection exists.
    pub fn disconnect_with(&self, slot: &Slot<S, T>, receiver: Option<ObjectId>) -> bool {
        let receiver = Receiver::resolve(slot, receiver);
        REGISTRY.with(|registry| {
            registry.borrow_mut().disconnect(
                self.sender.object_id(),
                self.signal.id(),
                slot_key(slot),
                receiver,
            )
        })
    }

    /// Invoke every live slot connected to this signal on this sender, in
    /// connection order.
    ///
    /// Slots connected while the emission runs are not invoked by it. Slots
    /// disconnected while it runs are not invoked once disconnected.
    pub fn emit(&self, args: &T) {
        emit_erased(self.sender.object_id(), self.signal.id(), self.sender, args);
    }
}

/// The object a connection is registered against for bulk teardown.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Receiver {
    Object(ObjectId),
    /// A slot connected without a receiver object receives on its own behalf.
    Slot(usize),
}

impl Receiver {
    /// The receiver key under which a bare slot is registered.
    pub fn of_slot<S, T>(slot: &Slot<S, T>) -> Self {
        Receiver::Slot(slot_key(slot))
    }

    fn resolve<S, T>(slot: &Slot<S, T>, receiver: Option<ObjectId>) -> Self {
        match receiver {
            Some(id) => Receiver::Object(id),
            None => Receiver::of_slot(slot),
        }
    }
}

fn slot_key<S, T>(slot: &Slot<S, T>) -> usize {
    Rc::as_ptr(slot) as *const () as usize
}

/// Remove every connection where `sender` is the sender.
pub fn disconnect_sender(sender: ObjectId) {
    REGISTRY.with(|registry| registry.borrow_mut().disconnect_sender(sender));
}

/// Remove every connection registered against `receiver`.
pub fn disconnect_receiver(receiver: Receiver) {
    REGISTRY.with(|registry| registry.borrow_mut().disconnect_receiver(receiver));
}

/// Remove every connection where `id` is the sender or the receiver object.
pub fn clear_signal_data(id: ObjectId) {
    disconnect_sender(id);
    disconnect_receiver(Receiver::Object(id));
}

/// Number of live connections with `sender` as the sender.
pub fn sender_connection_count(sender: ObjectId) -> usize {
    REGISTRY.with(|registry| {
        let registry = registry.borrow();
        registry.senders.get(&sender).map_or(0, |list| {
            list.conns
                .iter()
                .filter(|key| registry.connections[**key].invoke.is_some())
                .count()
        })
    })
}

struct Connection {
    sender: ObjectId,
    signal: SignalId,
    slot: usize,
    receiver: Receiver,
    /// `None` once disconnected. The entry stays in its sender list until
    /// that list is compacted.
    invoke: Option<ErasedSlot>,
    prev_in_receiver: Option<ConnKey>,
    next_in_receiver: Option<ConnKey>,
}

/// Receivers of one sender, in connection order.
struct ConnectionList {
    generation: u64,
    /// Emissions currently walking the list.
    refs: usize,
    /// Holds disconnected entries awaiting compaction.
    dirty: bool,
    conns: Vec<ConnKey>,
}

#[derive(Default)]
struct Registry {
    connections: Slab<Connection>,
    senders: HashMap<ObjectId, ConnectionList>,
    /// Head of each receiver's doubly linked list of connections.
    receivers: HashMap<Receiver, ConnKey>,
    next_generation: u64,
}

thread_local! {
    static REGISTRY: RefCell<Registry> = RefCell::new(Registry::default());
}

impl Registry {
    fn find(&self, sender: ObjectId, signal: SignalId, slot: usize, receiver: Receiver) -> Option<ConnKey> {
        let list = self.senders.get(&sender)?;
        list.conns.iter().copied().find(|key| {
            let conn = &self.connections[*key];
            conn.invoke.is_some()
                && conn.signal == signal
                && conn.slot == slot
                && conn.receiver == receiver
        })
    }

    fn connect(
        &mut self,
        sender: ObjectId,
        signal: SignalId,
        slot: usize,
        receiver: Receiver,
        invoke: ErasedSlot,
    ) -> bool {
        if self.find(sender, signal, slot, receiver).is_some() {
            return false;
        }

        let head = self.receivers.get(&receiver).copied();
        let key = self.connections.insert(Connection {
            sender,
            signal,
            slot,
            receiver,
            invoke: Some(invoke),
            prev_in_receiver: None,
            next_in_receiver: head,
        });
        if let Some(head) = head {
            self.connections[head].prev_in_receiver = Some(key);
        }
        self.receivers.insert(receiver, key);

        if !self.senders.contains_key(&sender) {
            self.next_generation += 1;
            self.senders.insert(
                sender,
                ConnectionList {
                    generation: self.next_generation,
                    refs: 0,
                    dirty: false,
                    conns: Vec::new(),
                },
            );
        }
        if let Some(list) = self.senders.get_mut(&sender) {
            list.conns.push(key);
        }
        true
    }

    fn disconnect(&mut self, sender: ObjectId, signal: SignalId, slot: usize, receiver: Receiver) -> bool {
        let Some(key) = self.find(sender, signal, slot, receiver) else {
            return false;
        };
        self.unlink_receiver(key);
        self.connections[key].invoke = None;
        self.release(sender);
        true
    }

    /// Compact a sender list now, or flag it for the emission walking it.
    fn release(&mut self, sender: ObjectId) {
        let Some(list) = self.senders.get_mut(&sender) else {
            return;
        };
        if list.refs > 0 {
            list.dirty = true;
        } else {
            self.compact(sender);
        }
    }

    fn unlink_receiver(&mut self, key: ConnKey) {
        let (receiver, prev, next) = {
            let conn = &self.connections[key];
            (conn.receiver, conn.prev_in_receiver, conn.next_in_receiver)
        };
        match (prev, next) {
            (None, None) => {
                self.receivers.remove(&receiver);
            }
            (None, Some(next)) => {
                self.receivers.insert(receiver, next);
                self.connections[next].prev_in_receiver = None;
            }
            (Some(prev), None) => {
                self.connections[prev].next_in_receiver = None;
            }
            (Some(prev), Some(next)) => {
                self.connections[prev].next_in_receiver = Some(next);
                self.connections[next].prev_in_receiver = Some(prev);
            }
        }
        let conn = &mut self.connections[key];
        conn.prev_in_receiver = None;
        conn.next_in_receiver = None;
    }

    fn disconnect_sender(&mut self, sender: ObjectId) {
        let Some(list) = self.senders.remove(&sender) else {
            return;
        };
        for key in list.conns {
            if self.connections[key].invoke.is_some() {
                self.unlink_receiver(key);
            }
            self.connections.remove(key);
        }
    }

    fn disconnect_receiver(&mut self, receiver: Receiver) {
        let mut senders = Vec::new();
        let mut cursor = self.receivers.remove(&receiver);
        while let Some(key) = cursor {
            let conn = &mut self.connections[key];
            cursor = conn.next_in_receiver.take();
            conn.prev_in_receiver = None;
            conn.invoke = None;
            if !senders.contains(&conn.sender) {
                senders.push(conn.sender);
            }
        }
        for sender in senders {
            self.release(sender);
        }
    }

    /// Drop the dead connections of a sender list that no emission is walking.
    fn compact(&mut self, sender: ObjectId) {
        let Some(list) = self.senders.get_mut(&sender) else {
            return;
        };
        list.dirty = false;
        let connections = &mut self.connections;
        list.conns.retain(|key| {
            if connections[*key].invoke.is_some() {
                true
            } else {
                connections.remove(*key);
                false
            }
        });
        if list.conns.is_empty() {
            self.senders.remove(&sender);
        }
    }
}

enum Step {
    Invoke(ErasedSlot),
    Skip,
    Stop,
}

/// Keeps the sender list's emission count balanced even if a slot panics.
struct EmitGuard {
    sender: ObjectId,
    generation: u64,
}

impl Drop for EmitGuard {
    fn drop(&mut self) {
        let _ = REGISTRY.try_with(|registry| {
            let mut registry = registry.borrow_mut();
            let compact = match registry.senders.get_mut(&self.sender) {
                Some(list) if list.generation == self.generation => {
                    list.refs -= 1;
                    list.refs == 0 && list.dirty
                }
                _ => false,
            };
            if compact {
                registry.compact(self.sender);
            }
        });
    }
}

fn emit_erased(sender_id: ObjectId, signal: SignalId, sender: &dyn Any, args: &dyn Any) {
    let entry = REGISTRY.with(|registry| {
        let mut registry = registry.borrow_mut();
        let list = registry.senders.get_mut(&sender_id)?;
        list.refs += 1;
        Some((list.generation, list.conns.len()))
    });
    let Some((generation, last)) = entry else {
        return;
    };
    let guard = EmitGuard {
        sender: sender_id,
        generation,
    };

    for index in 0..last {
        let step = REGISTRY.with(|registry| {
            let registry = registry.borrow();
            let list = match registry.senders.get(&sender_id) {
                Some(list) if list.generation == generation => list,
                // The sender was torn down by a slot.
                _ => return Step::Stop,
            };
            let conn = &registry.connections[list.conns[index]];
            match &conn.invoke {
                Some(invoke) if conn.signal == signal => Step::Invoke(Rc::clone(invoke)),
                _ => Step::Skip,
            }
        });
        match step {
            Step::Invoke(invoke) => invoke(sender, args),
            Step::Skip => {}
            Step::Stop => break,
        }
    }
    drop(guard);
}

#[cfg(test)]
#[path = "tests/signal_tests.rs"]
mod tests;
