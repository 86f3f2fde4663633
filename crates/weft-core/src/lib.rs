#![doc = r"Core runtime pieces for the weft widget toolkit: queues, signals, attached properties and message dispatch."]
#![allow(clippy::missing_const_for_thread_local)]

pub extern crate self as weft_core;

pub mod collections;
pub mod messaging;
pub mod object;
pub mod platform;
pub mod property;
pub mod queue;
pub mod signal;
pub mod tasks;

pub use messaging::{
    clear_message_data, dispatch_queue_len, has_pending_messages, install_message_filter,
    is_wake_up_scheduled, post_message, remove_message_filter, run_message_loop,
    send_message, send_pending_message, wake_up_message_loop, Message, MessageFilter,
    MessageHandler,
};
pub use object::{Object, ObjectId};
pub use platform::{schedule_frame, set_scheduler, DefaultScheduler, RuntimeScheduler};
pub use property::{
    clear_property_data, AttachedProperty, ChangedArgs, ObservableField, PropertyChangedArgs,
    PropertyOptions, PROPERTY_CHANGED,
};
pub use queue::Queue;
pub use signal::{
    clear_signal_data, disconnect_receiver, disconnect_sender, BoundSignal, Receiver, Signal,
    Slot,
};
pub use tasks::{cancel_local_task, has_local_tasks, poll_local_tasks, spawn_local, TaskId};

/// Drop every side-table entry of `id`: signal connections in both roles,
/// pending messages and filters, and attached property values.
pub fn clear_object_data(id: ObjectId) {
    clear_signal_data(id);
    clear_message_data(id);
    clear_property_data(id);
}
