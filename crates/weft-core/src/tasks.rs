//! A single-threaded pool for futures that hold `Rc` handles.
//!
//! Asynchronous collaborators (contents loading, renames) complete on the
//! thread that owns the widgets. The host polls the pool once per frame;
//! a task's waker requests another frame through the installed scheduler.

use crate::platform::{current_scheduler, schedule_frame, RuntimeScheduler};
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

struct TaskEntry {
    id: TaskId,
    future: Pin<Box<dyn Future<Output = ()> + 'static>>,
}

thread_local! {
    static TASKS: RefCell<Vec<TaskEntry>> = const { RefCell::new(Vec::new()) };
    static NEXT_TASK_ID: Cell<u64> = const { Cell::new(1) };
}

struct TaskWaker {
    scheduler: Arc<dyn RuntimeScheduler>,
}

impl futures_task::ArcWake for TaskWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.scheduler.schedule_frame();
    }
}

/// Queue `future` on this thread's pool and request a frame to poll it.
pub fn spawn_local<F>(future: F) -> TaskId
where
    F: Future<Output = ()> + 'static,
{
    let id = NEXT_TASK_ID.with(|next| {
        let id = next.get();
        next.set(id + 1);
        TaskId(id)
    });
    TASKS.with(|tasks| {
        tasks.borrow_mut().push(TaskEntry {
            id,
            future: Box::pin(future),
        })
    });
    log::trace!("spawned local task {:?}", id);
    schedule_frame();
    id
}

/// Drop a task before it completes. Returns `false` if it is unknown or
/// already finished.
pub fn cancel_local_task(id: TaskId) -> bool {
    let removed = TASKS.with(|tasks| {
        let mut tasks = tasks.borrow_mut();
        let index = tasks.iter().position(|entry| entry.id == id)?;
        Some(tasks.remove(index))
    });
    removed.is_some()
}

pub fn has_local_tasks() -> bool {
    TASKS.with(|tasks| !tasks.borrow().is_empty())
}

/// Tasks taken out of the pool for one polling round. Whatever has not
/// finished goes back into the pool when the round ends, including when a
/// task panics.
struct PollRound {
    remaining: std::vec::IntoIter<TaskEntry>,
    pending: Vec<TaskEntry>,
    finished: bool,
}

impl Drop for PollRound {
    fn drop(&mut self) {
        let mut survivors = std::mem::take(&mut self.pending);
        survivors.extend(self.remaining.by_ref());
        if !survivors.is_empty() {
            let _ = TASKS.try_with(|tasks| {
                let mut tasks = tasks.borrow_mut();
                // Tasks spawned during the round stay behind the survivors.
                let spawned = std::mem::replace(&mut *tasks, survivors);
                tasks.extend(spawned);
            });
        }
        if !self.finished {
            log::error!("local task panicked, rescheduling the task pool");
            schedule_frame();
        }
    }
}

/// Poll every task once. Returns whether any task completed.
///
/// Tasks spawned while polling run on the next call. If a task panics it is
/// dropped, the other tasks stay queued and a frame is requested before the
/// panic propagates.
pub fn poll_local_tasks() -> bool {
    let waker: Waker = futures_task::waker(Arc::new(TaskWaker {
        scheduler: current_scheduler(),
    }));
    let mut cx = Context::from_waker(&waker);

    let tasks = TASKS.with(|tasks| std::mem::take(&mut *tasks.borrow_mut()));
    let mut round = PollRound {
        remaining: tasks.into_iter(),
        pending: Vec::new(),
        finished: false,
    };
    let mut made_progress = false;
    while let Some(mut entry) = round.remaining.next() {
        match entry.future.as_mut().poll(&mut cx) {
            Poll::Ready(()) => made_progress = true,
            Poll::Pending => round.pending.push(entry),
        }
    }
    round.finished = true;
    made_progress
}

#[cfg(test)]
#[path = "tests/tasks_tests.rs"]
mod tests;
