//! Single-consumer task queue for thread-affine work
//!
//! Registry mutations touch GPU-facing resources (textures) and must run
//! on the rendering-capable thread that owns the `Dispatcher`. Calls
//! arriving on other threads enqueue a task; the owner drains the queue
//! in its run loop via [`Dispatcher::run_pending`].

use log::warn;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;
use std::thread::{self, ThreadId};

type Task = Box<dyn FnOnce() + Send>;

pub struct Dispatcher {
    owner: ThreadId,
    tx: Sender<Task>,
    // Receiver is !Sync; the mutex lets Dispatcher live in an Arc while
    // only the owner thread ever drains it.
    rx: Mutex<Receiver<Task>>,
}

impl Dispatcher {
    /// Create a dispatcher owned by the calling thread.
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Dispatcher {
            owner: thread::current().id(),
            tx,
            rx: Mutex::new(rx),
        }
    }

    /// Whether the calling thread is the owning thread.
    pub fn is_owner(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Enqueue a task to run on the owning thread.
    pub fn defer(&self, task: impl FnOnce() + Send + 'static) {
        // Send only fails once the dispatcher is being torn down.
        if self.tx.send(Box::new(task)).is_err() {
            warn!("dispatcher queue closed, task dropped");
        }
    }

    /// Drain and execute all queued tasks. Must be called on the owning
    /// thread; off-thread calls are rejected to preserve single-consumer
    /// discipline.
    pub fn run_pending(&self) {
        if !self.is_owner() {
            warn!("run_pending called off the owning thread, ignored");
            return;
        }
        let rx = self.rx.lock().unwrap();
        while let Ok(task) = rx.try_recv() {
            task();
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_owner_runs_inline_work() {
        let d = Dispatcher::new();
        assert!(d.is_owner());
    }

    #[test]
    fn test_deferred_task_runs_on_owner() {
        let d = Arc::new(Dispatcher::new());
        let counter = Arc::new(AtomicUsize::new(0));

        let d2 = d.clone();
        let c2 = counter.clone();
        let handle = thread::spawn(move || {
            assert!(!d2.is_owner());
            d2.defer(move || {
                c2.fetch_add(1, Ordering::SeqCst);
            });
        });
        handle.join().unwrap();

        // Not yet executed: only the owner drains the queue.
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        d.run_pending();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_run_pending_off_thread_is_noop() {
        let d = Arc::new(Dispatcher::new());
        let counter = Arc::new(AtomicUsize::new(0));
        let c2 = counter.clone();
        d.defer(move || {
            c2.fetch_add(1, Ordering::SeqCst);
        });

        let d2 = d.clone();
        thread::spawn(move || d2.run_pending()).join().unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        d.run_pending();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
