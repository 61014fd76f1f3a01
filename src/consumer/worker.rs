use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};
use crossbeam::select;
use tracing::{debug, trace, warn};

use crate::pipeline::cancel::ShutdownToken;
use crate::pipeline::registry::FrameSink;

/// Lifecycle of a consumer thread. `Stopped` is terminal — a consumer that
/// has idled out or been cancelled never restarts; the owner must spawn a
/// fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConsumerState {
    Idle = 0,
    Running = 1,
    Stopped = 2,
}

impl ConsumerState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Idle,
            1 => Self::Running,
            _ => Self::Stopped,
        }
    }
}

/// What a consumer does with each received frame.
///
/// `on_frame` runs synchronously on the consumer's own thread and returns
/// whether the consumer should keep going — a display surface, for one,
/// stops when the user dismisses it. `on_stop` runs exactly once when the
/// thread winds down, however it got there.
pub trait FrameHandler<T>: Send + 'static {
    fn on_frame(&mut self, frame: Arc<T>) -> std::ops::ControlFlow<()>;

    fn on_stop(&mut self) {}
}

/// A dedicated thread draining one bounded frame queue into an effect.
///
/// The thread waits up to `idle_timeout` for each frame and terminates
/// when the window passes empty — when frame production stops (end of a
/// recording, camera gone) the consumer winds itself down instead of
/// spinning forever. A triggered [`ShutdownToken`] ends the thread
/// immediately without waiting out the idle window.
pub struct ConsumerThread<T> {
    name: String,
    tx: Sender<Arc<T>>,
    state: Arc<AtomicU8>,
    dropped: Arc<AtomicU64>,
    thread: Option<JoinHandle<()>>,
}

impl<T: Send + Sync + 'static> ConsumerThread<T> {
    /// Spawn a consumer named `name` with a queue of `capacity` frames.
    pub fn spawn<H>(
        name: &str,
        capacity: usize,
        idle_timeout: Duration,
        shutdown: ShutdownToken,
        handler: H,
    ) -> Self
    where
        H: FrameHandler<T>,
    {
        let (tx, rx) = bounded(capacity);
        let state = Arc::new(AtomicU8::new(ConsumerState::Idle as u8));
        let dropped = Arc::new(AtomicU64::new(0));

        let thread = {
            let state = Arc::clone(&state);
            let name = name.to_string();
            std::thread::Builder::new()
                .name(format!("consumer-{name}"))
                .spawn(move || {
                    run_consumer(&name, rx, idle_timeout, shutdown, handler, &state);
                })
                .expect("failed to spawn consumer thread")
        };

        Self {
            name: name.to_string(),
            tx,
            state,
            dropped,
            thread: Some(thread),
        }
    }

    /// A cloneable sink handle for registering with the fan-out stage.
    pub fn sink(&self) -> ConsumerSink<T> {
        ConsumerSink {
            name: self.name.clone(),
            tx: self.tx.clone(),
            dropped: Arc::clone(&self.dropped),
        }
    }

    pub fn state(&self) -> ConsumerState {
        ConsumerState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Frames discarded because the queue was full at delivery time.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Wait for the thread to finish. Does not itself request a stop; the
    /// thread ends via idle timeout, handler stop, or the shutdown token.
    pub fn join(&mut self) {
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                warn!("consumer {} panicked", self.name);
            }
        }
    }
}

fn run_consumer<T, H>(
    name: &str,
    rx: Receiver<Arc<T>>,
    idle_timeout: Duration,
    shutdown: ShutdownToken,
    mut handler: H,
    state: &AtomicU8,
) where
    T: Send + Sync + 'static,
    H: FrameHandler<T>,
{
    state.store(ConsumerState::Running as u8, Ordering::Release);
    debug!("consumer {name} running");
    let cancel = shutdown.observer();

    loop {
        select! {
            recv(rx) -> msg => match msg {
                Ok(frame) => {
                    if handler.on_frame(frame).is_break() {
                        debug!("consumer {name} stopped by its handler");
                        break;
                    }
                }
                // Every sender gone — nothing will ever arrive again
                Err(_) => {
                    debug!("consumer {name} queue closed");
                    break;
                }
            },
            recv(cancel) -> _ => {
                debug!("consumer {name} shut down");
                break;
            },
            default(idle_timeout) => {
                debug!("consumer {name} idle for {idle_timeout:?}, winding down");
                break;
            },
        }
    }

    handler.on_stop();
    state.store(ConsumerState::Stopped as u8, Ordering::Release);
}

/// Sink half of a consumer — hands frames to the consumer's queue without
/// ever blocking the publisher.
pub struct ConsumerSink<T> {
    name: String,
    tx: Sender<Arc<T>>,
    dropped: Arc<AtomicU64>,
}

impl<T: Send + Sync> FrameSink<T> for ConsumerSink<T> {
    fn put_frame(&self, frame: Arc<T>) {
        match self.tx.try_send(frame) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                // The consumer is behind; it will catch up on fresher frames
                self.dropped.fetch_add(1, Ordering::Relaxed);
                trace!("consumer {} queue full, frame dropped", self.name);
            }
            Err(TrySendError::Disconnected(_)) => {
                trace!("consumer {} already stopped, frame discarded", self.name);
            }
        }
    }
}
