//! Attached properties: typed values stored on an object from outside its
//! own definition.
//!
//! An [`AttachedProperty`] is a stateless descriptor. Values live in a
//! thread-local side table keyed by the owner's [`ObjectId`] and are dropped
//! by [`clear_property_data`].

use crate::collections::map::HashMap;
use crate::object::{Object, ObjectId};
use crate::signal::{BoundSignal, Signal};
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

static NEXT_PROPERTY_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct PropertyId(u64);

thread_local! {
    static STORE: RefCell<HashMap<ObjectId, HashMap<PropertyId, Box<dyn Any>>>> =
        RefCell::new(HashMap::default());
}

/// Emitted with the owner's id as sender whenever any non-silent attached
/// property of that owner changes, after the property's own changed signal.
pub static PROPERTY_CHANGED: Signal<ObjectId, PropertyChangedArgs> = Signal::new("property-changed");

/// Payload of the property-scoped changed signal.
#[derive(Clone, Debug, PartialEq)]
pub struct ChangedArgs<V> {
    pub name: &'static str,
    pub old_value: V,
    pub new_value: V,
}

/// Type-erased change notification shared by every property of an owner.
#[derive(Clone)]
pub struct PropertyChangedArgs {
    name: &'static str,
    old_value: Rc<dyn Any>,
    new_value: Rc<dyn Any>,
}

impl PropertyChangedArgs {
    pub fn new<V: 'static>(name: &'static str, old_value: V, new_value: V) -> Self {
        Self {
            name,
            old_value: Rc::new(old_value),
            new_value: Rc::new(new_value),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The previous value, if it has type `V`.
    pub fn old_value<V: 'static>(&self) -> Option<&V> {
        self.old_value.downcast_ref()
    }

    /// The new value, if it has type `V`.
    pub fn new_value<V: 'static>(&self) -> Option<&V> {
        self.new_value.downcast_ref()
    }
}

impl fmt::Debug for PropertyChangedArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyChangedArgs")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Behaviour of an [`AttachedProperty`], assembled with `const` builders so
/// descriptors can be declared as statics.
pub struct PropertyOptions<O: 'static, V> {
    name: &'static str,
    create: fn(&O) -> V,
    coerce: Option<fn(&O, V) -> V>,
    compare: Option<fn(&V, &V) -> bool>,
    changed: Option<fn(&O, &V, &V)>,
    notify: Option<&'static Signal<O, PropertyChangedArgs>>,
    silent: bool,
}

impl<O: 'static, V> Clone for PropertyOptions<O, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<O: 'static, V> Copy for PropertyOptions<O, V> {}

impl<O: Object, V: 'static> PropertyOptions<O, V> {
    /// `create` computes the default value the first time an owner's value
    /// is needed.
    pub const fn new(name: &'static str, create: fn(&O) -> V) -> Self {
        Self {
            name,
            create,
            coerce: None,
            compare: None,
            changed: None,
            notify: None,
            silent: false,
        }
    }

    pub const fn coerce(self, coerce: fn(&O, V) -> V) -> Self {
        Self {
            coerce: Some(coerce),
            ..self
        }
    }

    /// Replace the default `PartialEq` comparison. Returning `true` means
    /// "unchanged".
    pub const fn compare(self, compare: fn(&V, &V) -> bool) -> Self {
        Self {
            compare: Some(compare),
            ..self
        }
    }

    /// Run `changed(owner, old, new)` before any signal is emitted.
    pub const fn changed(self, changed: fn(&O, &V, &V)) -> Self {
        Self {
            changed: Some(changed),
            ..self
        }
    }

    /// Also emit `signal` on the owner after the generic notifications.
    pub const fn notify(self, signal: &'static Signal<O, PropertyChangedArgs>) -> Self {
        Self {
            notify: Some(signal),
            ..self
        }
    }

    /// Suppress every changed signal. The `changed` callback still runs.
    pub const fn silent(self) -> Self {
        Self {
            silent: true,
            ..self
        }
    }
}

/// A property descriptor.
///
/// ```
/// use weft_core::{AttachedProperty, Object, ObjectId, PropertyOptions};
///
/// struct Knob(ObjectId);
///
/// impl Object for Knob {
///     fn object_id(&self) -> ObjectId {
///         self.0
///     }
/// }
///
/// fn zero(_: &Knob) -> i32 {
///     0
/// }
///
/// fn clamp(_: &Knob, value: i32) -> i32 {
///     value.clamp(0, 10)
/// }
///
/// static LEVEL: AttachedProperty<Knob, i32> =
///     AttachedProperty::new(PropertyOptions::new("level", zero).coerce(clamp));
///
/// let knob = Knob(ObjectId::next());
/// assert_eq!(LEVEL.get(&knob), 0);
/// LEVEL.set(&knob, 42);
/// assert_eq!(LEVEL.get(&knob), 10);
/// ```
pub struct AttachedProperty<O: 'static, V> {
    options: PropertyOptions<O, V>,
    id: OnceLock<PropertyId>,
    changed_signal: Signal<O, ChangedArgs<V>>,
}

impl<O: Object, V: Clone + PartialEq + 'static> AttachedProperty<O, V> {
    pub const fn new(options: PropertyOptions<O, V>) -> Self {
        Self {
            changed_signal: Signal::new(options.name),
            options,
            id: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.options.name
    }

    fn id(&self) -> PropertyId {
        *self
            .id
            .get_or_init(|| PropertyId(NEXT_PROPERTY_ID.fetch_add(1, Ordering::Relaxed)))
    }

    /// The signal emitted when this property changes on any owner.
    pub fn changed_signal(&self) -> &Signal<O, ChangedArgs<V>> {
        &self.changed_signal
    }

    /// The changed signal bound to `owner`.
    pub fn changed<'a>(&'a self, owner: &'a O) -> BoundSignal<'a, O, ChangedArgs<V>> {
        self.changed_signal.bind(owner)
    }

    /// The current value, computing and caching the default if unset.
    /// Creating the default does not notify.
    pub fn get(&self, owner: &O) -> V {
        let owner_id = owner.object_id();
        if let Some(value) = self.lookup(owner_id) {
            return value;
        }
        let value = (self.options.create)(owner);
        self.store(owner_id, value.clone());
        value
    }

    /// The stored value, without creating the default.
    pub fn peek(&self, owner: &O) -> Option<V> {
        self.lookup(owner.object_id())
    }

    /// Coerce and store `value`, notifying if it differs from the previous
    /// value.
    pub fn set(&self, owner: &O, value: V) {
        let old_value = self.get(owner);
        let new_value = self.coerce_value(owner, value);
        self.store(owner.object_id(), new_value.clone());
        self.maybe_notify(owner, old_value, new_value);
    }

    /// Re-apply coercion to the current value.
    pub fn coerce(&self, owner: &O) {
        let old_value = self.get(owner);
        let new_value = self.coerce_value(owner, old_value.clone());
        self.store(owner.object_id(), new_value.clone());
        self.maybe_notify(owner, old_value, new_value);
    }

    fn coerce_value(&self, owner: &O, value: V) -> V {
        match self.options.coerce {
            Some(coerce) => coerce(owner, value),
            None => value,
        }
    }

    fn lookup(&self, owner_id: ObjectId) -> Option<V> {
        let id = self.id();
        STORE.with(|store| {
            store
                .borrow()
                .get(&owner_id)
                .and_then(|values| values.get(&id))
                .and_then(|value| value.downcast_ref::<V>())
                .cloned()
        })
    }

    fn store(&self, owner_id: ObjectId, value: V) {
        let id = self.id();
        STORE.with(|store| {
            store
                .borrow_mut()
                .entry(owner_id)
                .or_default()
                .insert(id, Box::new(value));
        });
    }

    fn maybe_notify(&self, owner: &O, old_value: V, new_value: V) {
        let unchanged = match self.options.compare {
            Some(compare) => compare(&old_value, &new_value),
            None => old_value == new_value,
        };
        if unchanged {
            return;
        }
        if let Some(changed) = self.options.changed {
            changed(owner, &old_value, &new_value);
        }
        if self.options.silent {
            return;
        }
        log::trace!("property {} changed on {}", self.options.name, owner.object_id());

        self.changed_signal.bind(owner).emit(&ChangedArgs {
            name: self.options.name,
            old_value: old_value.clone(),
            new_value: new_value.clone(),
        });
        let args = PropertyChangedArgs::new(self.options.name, old_value, new_value);
        PROPERTY_CHANGED.bind(&owner.object_id()).emit(&args);
        if let Some(notify) = self.options.notify {
            notify.bind(owner).emit(&args);
        }
    }
}

/// Drop every attached property value stored for `owner`, without
/// notification.
pub fn clear_property_data(owner: ObjectId) {
    // Values are dropped after the borrow ends; their destructors may touch
    // the store.
    let removed = STORE.with(|store| store.borrow_mut().remove(&owner));
    drop(removed);
}

/// A plain struct field that reports changes so its owner can notify.
///
/// Used for per-object state that does not need a global descriptor.
pub struct ObservableField<T> {
    name: &'static str,
    value: RefCell<T>,
}

impl<T: Clone + PartialEq + 'static> ObservableField<T> {
    pub fn new(name: &'static str, value: T) -> Self {
        Self {
            name,
            value: RefCell::new(value),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Store `value` and describe the change, or return `None` if the value
    /// is equal to the current one.
    pub fn set(&self, value: T) -> Option<PropertyChangedArgs> {
        let old_value = self.replace(value.clone());
        (old_value != value).then(|| PropertyChangedArgs::new(self.name, old_value, value))
    }

    /// Store `value` without comparison, returning the previous value.
    pub fn replace(&self, value: T) -> T {
        self.value.replace(value)
    }

    /// Re-derive the value from the current one.
    pub fn coerce(&self, f: impl FnOnce(&T) -> T) -> Option<PropertyChangedArgs> {
        let value = f(&self.value.borrow());
        self.set(value)
    }

    /// Store `value` and emit `signal` on `owner` if it changed.
    pub fn set_and_notify<S: Object>(
        &self,
        owner: &S,
        signal: &Signal<S, PropertyChangedArgs>,
        value: T,
    ) -> bool {
        match self.set(value) {
            Some(args) => {
                signal.bind(owner).emit(&args);
                true
            }
            None => false,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableField")
            .field("name", &self.name)
            .field("value", &self.value)
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/property_tests.rs"]
mod tests;
