//! Host integration: how the runtime asks the host for another frame.

use std::cell::RefCell;
use std::sync::Arc;

/// Requests a callback from the host environment.
///
/// The host answers a request by calling
/// [`run_message_loop`](crate::run_message_loop) (and, when tasks are in use,
/// [`poll_local_tasks`](crate::poll_local_tasks)) on the thread that owns the
/// widgets. Implementations are shared with wakers, so they must be
/// `Send + Sync` even though the loop itself is thread-local.
pub trait RuntimeScheduler: Send + Sync {
    fn schedule_frame(&self);
}

/// Scheduler that ignores frame requests. Hosts using it drive the loop
/// themselves.
#[derive(Debug, Default)]
pub struct DefaultScheduler;

impl RuntimeScheduler for DefaultScheduler {
    fn schedule_frame(&self) {}
}

thread_local! {
    static SCHEDULER: RefCell<Arc<dyn RuntimeScheduler>> = RefCell::new(Arc::new(DefaultScheduler));
}

/// Install the scheduler used by this thread's message loop and task pool,
/// returning the previous one.
pub fn set_scheduler(scheduler: Arc<dyn RuntimeScheduler>) -> Arc<dyn RuntimeScheduler> {
    SCHEDULER.with(|slot| slot.replace(scheduler))
}

pub fn current_scheduler() -> Arc<dyn RuntimeScheduler> {
    SCHEDULER.with(|slot| slot.borrow().clone())
}

/// Ask the installed scheduler for a frame.
pub fn schedule_frame() {
    // Cloned out first: a scheduler may call back into `set_scheduler`.
    let scheduler = current_scheduler();
    scheduler.schedule_frame();
}
