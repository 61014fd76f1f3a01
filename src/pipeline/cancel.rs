use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam::channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;

/// Shared shutdown signal for the orchestrator and consumer threads.
///
/// Cloned handles observe the same trigger. Besides the flag, the token
/// carries a channel that is closed on trigger, so threads blocked in a
/// `select!` wake immediately instead of waiting out their receive timeout.
#[derive(Clone)]
pub struct ShutdownToken {
    inner: Arc<Inner>,
}

struct Inner {
    triggered: AtomicBool,
    // Dropping the sender closes the channel; every cloned observer then
    // sees a disconnect. No message is ever sent through it.
    keep_open: Mutex<Option<Sender<()>>>,
    observer: Receiver<()>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        let (tx, rx) = bounded(0);
        Self {
            inner: Arc::new(Inner {
                triggered: AtomicBool::new(false),
                keep_open: Mutex::new(Some(tx)),
                observer: rx,
            }),
        }
    }

    /// Signal shutdown. Idempotent.
    pub fn trigger(&self) {
        self.inner.triggered.store(true, Ordering::Release);
        self.inner.keep_open.lock().take();
    }

    pub fn is_triggered(&self) -> bool {
        self.inner.triggered.load(Ordering::Acquire)
    }

    /// A receiver that disconnects when the token is triggered, for use in
    /// `crossbeam::select!`.
    pub fn observer(&self) -> Receiver<()> {
        self.inner.observer.clone()
    }
}

impl Default for ShutdownToken {
    fn default() -> Self {
        Self::new()
    }
}
