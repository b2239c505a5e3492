//! Delivery of completions onto the host's main execution context.
//!
//! # Design
//! `Outtie::create_link` finishes on a worker thread but hosts usually drive
//! UI from the result, so completions are handed to a `Dispatcher` instead of
//! being called directly. `MainQueue` is a channel the host drains from its UI
//! thread; `InlineDispatcher` runs the task wherever it is delivered.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// A unit of work handed to a `Dispatcher`.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Schedules a task on some execution context.
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, task: Task);
}

/// Runs each task immediately on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineDispatcher;

impl Dispatcher for InlineDispatcher {
    fn dispatch(&self, task: Task) {
        task();
    }
}

/// Queue drained by the thread that owns it, normally the host's UI thread.
///
/// `MainQueue` itself stays on that thread; `dispatcher()` hands out
/// `Send` handles for the SDK to enqueue onto.
pub struct MainQueue {
    tx: Sender<Task>,
    rx: Receiver<Task>,
}

/// Enqueues onto a `MainQueue`.
#[derive(Clone)]
pub struct MainQueueDispatcher {
    tx: Sender<Task>,
}

impl Default for MainQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MainQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub fn dispatcher(&self) -> MainQueueDispatcher {
        MainQueueDispatcher {
            tx: self.tx.clone(),
        }
    }

    /// Run every task queued so far without blocking. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task();
            ran += 1;
        }
        ran
    }

    /// Block up to `timeout` for the next task and run it. Returns `false` on
    /// timeout.
    pub fn run_next(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(task) => {
                task();
                true
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }
}

impl Dispatcher for MainQueueDispatcher {
    fn dispatch(&self, task: Task) {
        // The receiver lives as long as the MainQueue; once the host drops it
        // there is nobody left to deliver to.
        if self.tx.send(task).is_err() {
            tracing::warn!("main queue dropped, completion discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn inline_runs_immediately() {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        InlineDispatcher.dispatch(Box::new(move || {
            h.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn main_queue_defers_until_drained() {
        let queue = MainQueue::new();
        let hits = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let h = hits.clone();
            queue.dispatcher().dispatch(Box::new(move || {
                h.fetch_add(1, Ordering::SeqCst);
            }));
        }
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(queue.run_pending(), 3);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert_eq!(queue.run_pending(), 0);
    }

    #[test]
    fn main_queue_runs_tasks_on_owning_thread() {
        let queue = MainQueue::new();
        let dispatcher = queue.dispatcher();
        let owner = thread::current().id();

        thread::spawn(move || {
            dispatcher.dispatch(Box::new(move || {
                assert_eq!(thread::current().id(), owner);
            }));
        })
        .join()
        .unwrap();

        assert!(queue.run_next(Duration::from_secs(1)));
    }

    #[test]
    fn run_next_times_out_when_empty() {
        let queue = MainQueue::new();
        assert!(!queue.run_next(Duration::from_millis(10)));
    }

    #[test]
    fn dispatch_after_queue_dropped_is_discarded() {
        let queue = MainQueue::new();
        let dispatcher = queue.dispatcher();
        drop(queue);
        dispatcher.dispatch(Box::new(|| panic!("must not run")));
    }
}
