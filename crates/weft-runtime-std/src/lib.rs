//! Standard runtime services backed by Rust's `std` library.
//!
//! This crate provides a concrete [`RuntimeScheduler`] for `weft-core`.
//! Applications construct a [`StdRuntime`] on the thread that owns their
//! widgets and call [`StdRuntime::run_frame`] whenever a frame has been
//! requested.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use weft_core::{poll_local_tasks, run_message_loop, set_scheduler, RuntimeScheduler};

type FrameWaker = Arc<dyn Fn() + Send + Sync + 'static>;

/// Scheduler that records frame requests in an atomic flag.
pub struct StdScheduler {
    frame_requested: AtomicBool,
    frame_waker: RwLock<Option<FrameWaker>>,
}

impl StdScheduler {
    pub fn new() -> Self {
        Self {
            frame_requested: AtomicBool::new(false),
            frame_waker: RwLock::new(None),
        }
    }

    /// Returns whether a frame has been requested since the last call.
    pub fn take_frame_request(&self) -> bool {
        self.frame_requested.swap(false, Ordering::SeqCst)
    }

    /// Registers a waker that will be invoked whenever a new frame is scheduled.
    pub fn set_frame_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        *self
            .frame_waker
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(waker));
    }

    /// Clears any registered frame waker.
    pub fn clear_frame_waker(&self) {
        *self
            .frame_waker
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn wake(&self) {
        let waker = self
            .frame_waker
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(waker) = waker {
            waker();
        }
    }
}

impl Default for StdScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StdScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdScheduler")
            .field(
                "frame_requested",
                &self.frame_requested.load(Ordering::SeqCst),
            )
            .finish()
    }
}

impl RuntimeScheduler for StdScheduler {
    fn schedule_frame(&self) {
        self.frame_requested.store(true, Ordering::SeqCst);
        self.wake();
    }
}

/// Work done by one [`StdRuntime::run_frame`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Whether any local task completed.
    pub tasks_completed: bool,
    /// Dispatch queue entries processed by the message loop.
    pub messages_dispatched: usize,
}

impl FrameReport {
    pub fn is_idle(&self) -> bool {
        !self.tasks_completed && self.messages_dispatched == 0
    }
}

/// Drives the message loop and task pool of the current thread.
///
/// Creating a runtime installs its scheduler for the current thread.
#[derive(Clone)]
pub struct StdRuntime {
    scheduler: Arc<StdScheduler>,
}

impl StdRuntime {
    /// Upper bound on frames run by [`run_until_idle`](Self::run_until_idle).
    pub const MAX_FRAMES: usize = 1000;

    pub fn new() -> Self {
        let scheduler = Arc::new(StdScheduler::default());
        set_scheduler(scheduler.clone());
        Self { scheduler }
    }

    /// Returns the scheduler implementation.
    pub fn scheduler(&self) -> Arc<StdScheduler> {
        Arc::clone(&self.scheduler)
    }

    /// Returns whether a frame was requested since the last poll.
    pub fn take_frame_request(&self) -> bool {
        self.scheduler.take_frame_request()
    }

    /// Registers a waker to be called when the runtime schedules a new frame.
    pub fn set_frame_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        self.scheduler.set_frame_waker(waker);
    }

    /// Clears any previously registered frame waker.
    pub fn clear_frame_waker(&self) {
        self.scheduler.clear_frame_waker();
    }

    /// Poll local tasks once, then run one batch of the message loop.
    pub fn run_frame(&self) -> FrameReport {
        let tasks_completed = poll_local_tasks();
        let messages_dispatched = run_message_loop();
        FrameReport {
            tasks_completed,
            messages_dispatched,
        }
    }

    /// Run frames for as long as they keep being requested.
    ///
    /// Returns the number of frames run. Stops after [`Self::MAX_FRAMES`].
    pub fn run_until_idle(&self) -> usize {
        let mut frames = 0;
        while self.take_frame_request() {
            if frames == Self::MAX_FRAMES {
                log::warn!("still requesting frames after {} frames", frames);
                break;
            }
            self.run_frame();
            frames += 1;
        }
        frames
    }
}

impl fmt::Debug for StdRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdRuntime")
            .field("scheduler", &self.scheduler)
            .finish()
    }
}

impl Default for StdRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/std_runtime_tests.rs"]
mod tests;
