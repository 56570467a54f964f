//! The interactive thread.
//!
//! Background work never touches presentation state directly. It posts a
//! closure to the [`MainQueue`], and the thread that owns the queue runs it
//! during its next pump. That thread is the one that created the queue.

use std::marker::PhantomData;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use tracing::debug;

type Job = Box<dyn FnOnce() + Send>;

/// Job queue drained by the interactive thread. Not `Send`: it stays on the
/// thread that created it.
pub struct MainQueue {
    receiver: Receiver<Job>,
    handle: MainHandle,
    _bound: PhantomData<*const ()>,
}

/// Cloneable sender side of a [`MainQueue`], usable from any thread.
#[derive(Clone, Debug)]
pub struct MainHandle {
    sender: Sender<Job>,
    thread: ThreadId,
}

impl MainQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            receiver,
            handle: MainHandle {
                sender,
                thread: thread::current().id(),
            },
            _bound: PhantomData,
        }
    }

    pub fn handle(&self) -> MainHandle {
        self.handle.clone()
    }

    /// Run every job already queued. Never blocks.
    pub fn pump(&self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.receiver.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Wait up to `timeout` for one job, then drain whatever else is queued.
    pub fn pump_timeout(&self, timeout: Duration) -> usize {
        match self.receiver.recv_timeout(timeout) {
            Ok(job) => {
                job();
                1 + self.pump()
            }
            Err(_) => 0,
        }
    }

    /// Pump until `done` returns true or `timeout` elapses. Returns whether
    /// `done` was satisfied.
    pub fn pump_until(&self, mut done: impl FnMut() -> bool, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.pump();
            if done() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            self.pump_timeout(deadline - now);
        }
    }
}

impl Default for MainQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MainHandle {
    /// Queue `job` for the interactive thread. Dropped if the queue is gone.
    pub fn post(&self, job: impl FnOnce() + Send + 'static) {
        if self.sender.send(Box::new(job)).is_err() {
            debug!("interactive queue closed, dropping job");
        }
    }

    pub fn is_interactive_thread(&self) -> bool {
        thread::current().id() == self.thread
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn jobs_run_on_pumping_thread() {
        let queue = MainQueue::new();
        let handle = queue.handle();
        let seen = Arc::new(AtomicUsize::new(0));

        let worker = {
            let handle = handle.clone();
            let seen = seen.clone();
            thread::spawn(move || {
                assert!(!handle.is_interactive_thread());
                let check = handle.clone();
                handle.post(move || {
                    assert!(check.is_interactive_thread());
                    seen.fetch_add(1, Ordering::SeqCst);
                });
            })
        };
        worker.join().unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 0);
        assert_eq!(queue.pump(), 1);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn pump_on_empty_queue_returns_zero() {
        let queue = MainQueue::new();
        assert_eq!(queue.pump(), 0);
        assert_eq!(queue.pump_timeout(Duration::from_millis(5)), 0);
    }

    #[test]
    fn jobs_run_in_post_order() {
        let queue = MainQueue::new();
        let handle = queue.handle();
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        for i in 0..5 {
            let order = order.clone();
            handle.post(move || order.lock().unwrap().push(i));
        }
        queue.pump();
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn pump_until_waits_for_late_job() {
        let queue = MainQueue::new();
        let handle = queue.handle();
        let flag = Arc::new(AtomicUsize::new(0));
        let posted = flag.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            handle.post(move || {
                posted.store(1, Ordering::SeqCst);
            });
        });
        assert!(queue.pump_until(|| flag.load(Ordering::SeqCst) == 1, Duration::from_secs(5)));
    }

    #[test]
    fn pump_until_times_out() {
        let queue = MainQueue::new();
        assert!(!queue.pump_until(|| false, Duration::from_millis(10)));
    }

    #[test]
    fn post_after_queue_dropped_is_silent() {
        let handle = MainQueue::new().handle();
        handle.post(|| panic!("must not run"));
    }
}
