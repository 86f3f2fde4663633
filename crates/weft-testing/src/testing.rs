use std::cell::RefCell;
use std::future::Future;
use std::pin::pin;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use weft_core::{dispatch_queue_len, set_scheduler, Message, RuntimeScheduler};
use weft_runtime_std::{FrameReport, StdRuntime};
use weft_widget::{document_body, VisualNode, Widget, WidgetHooks, WidgetMessage};

/// Headless harness for driving the message loop and task pool in tests.
///
/// Creating a rule installs a fresh [`StdRuntime`] scheduler on the current
/// thread. Frames only run when the test asks for them.
pub struct LoopRule {
    runtime: StdRuntime,
}

impl LoopRule {
    /// Upper bound on frames run by [`pump_until_idle`](Self::pump_until_idle).
    pub const MAX_FRAMES: usize = 100;

    pub fn new() -> Self {
        Self {
            runtime: StdRuntime::new(),
        }
    }

    pub fn runtime(&self) -> &StdRuntime {
        &self.runtime
    }

    /// Returns whether a frame was requested since the last call.
    pub fn take_frame_request(&self) -> bool {
        self.runtime.take_frame_request()
    }

    /// Poll tasks once and run one message batch.
    pub fn run_frame(&self) -> FrameReport {
        self.runtime.run_frame()
    }

    /// Run frames while frames are requested or messages are queued,
    /// returning how many ran.
    ///
    /// Panics if work is still pending after [`Self::MAX_FRAMES`] frames.
    pub fn pump_until_idle(&self) -> usize {
        let mut frames = 0;
        loop {
            let requested = self.take_frame_request();
            if !requested && dispatch_queue_len() == 0 {
                break;
            }
            if frames == Self::MAX_FRAMES {
                panic!("pump_until_idle looped too many times!");
            }
            self.run_frame();
            frames += 1;
        }
        log::debug!("loop idle after {} frames", frames);
        frames
    }

    /// Attach `widget` to a new host node in the document.
    pub fn attach(&self, widget: &Widget) -> VisualNode {
        let host = attached_host();
        if let Err(err) = widget.attach(&host) {
            panic!("attach failed: {err}");
        }
        host
    }
}

impl Default for LoopRule {
    fn default() -> Self {
        Self::new()
    }
}

/// A new node appended to the document body.
pub fn attached_host() -> VisualNode {
    let host = VisualNode::new("div");
    document_body().append_child(&host);
    host
}

/// Scheduler that only counts frame requests.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    requests: AtomicUsize,
}

impl ManualScheduler {
    /// Install a new manual scheduler on the current thread.
    pub fn install() -> Arc<Self> {
        let scheduler = Arc::new(Self::default());
        set_scheduler(scheduler.clone());
        scheduler
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Returns the requests since the last call and resets the count.
    pub fn take_requests(&self) -> usize {
        self.requests.swap(0, Ordering::SeqCst)
    }
}

impl RuntimeScheduler for ManualScheduler {
    fn schedule_frame(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

/// Poll `future` once and return its output.
///
/// Panics if the future is not ready, which for the in-memory collaborators
/// of this crate means a bug.
pub fn poll_ready<F: Future>(future: F) -> F::Output {
    let mut future = pin!(future);
    let mut cx = Context::from_waker(futures_task::noop_waker_ref());
    match future.as_mut().poll(&mut cx) {
        Poll::Ready(output) => output,
        Poll::Pending => panic!("future was not ready"),
    }
}

/// Shared, ordered record of delivered messages as `name:kind` entries.
#[derive(Clone, Debug, Default)]
pub struct MessageLog {
    entries: Rc<RefCell<Vec<String>>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: String) {
        self.entries.borrow_mut().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    /// Entries whose message kind is `kind`.
    pub fn of_kind(&self, kind: &str) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.rsplit(':').next() == Some(kind))
            .cloned()
            .collect()
    }

    /// Message kinds delivered to the widget recorded as `name`.
    pub fn kinds_for(&self, name: &str) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter_map(|entry| entry.split_once(':'))
            .filter(|(who, _)| *who == name)
            .map(|(_, kind)| kind.to_string())
            .collect()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

/// Stock widget behaviour that also records every delivered message.
pub struct RecordingHooks {
    name: &'static str,
    log: MessageLog,
}

impl RecordingHooks {
    pub fn new(name: &'static str, log: &MessageLog) -> Self {
        Self {
            name,
            log: log.clone(),
        }
    }

    /// A widget with recording hooks.
    pub fn widget(name: &'static str, log: &MessageLog) -> Widget {
        Widget::with_hooks(Rc::new(Self::new(name, log)))
    }
}

impl WidgetHooks for RecordingHooks {
    fn process_message(&self, widget: &Widget, msg: &WidgetMessage) {
        self.log.push(format!("{}:{}", self.name, msg.kind()));
        widget.process_default(msg);
    }
}
