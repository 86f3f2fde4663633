//! Stable identities for objects that take part in signal, message and
//! property bookkeeping.
//!
//! The side tables in this crate are keyed by [`ObjectId`] rather than by
//! pointer identity. Entries live until the owner calls the matching
//! teardown (`clear_signal_data`, `clear_message_data`,
//! `clear_property_data`); an owner that is dropped without teardown leaks
//! its side-table entries for the lifetime of the thread.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a participating object.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Allocate a fresh identity. Identities are never reused.
    pub fn next() -> Self {
        Self(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Anything that can act as a signal sender, signal receiver, message
/// handler or attached-property owner.
pub trait Object: 'static {
    fn object_id(&self) -> ObjectId;
}

impl Object for ObjectId {
    fn object_id(&self) -> ObjectId {
        *self
    }
}
