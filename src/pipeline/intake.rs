use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::source::types::DepthFrame;

/// Freshest-frame hand-off between the camera callback and the transform
/// stage.
///
/// A single slot replaces a grow-forever queue: the producer overwrites
/// whatever the transform has not picked up yet, so under processing lag
/// the pipeline never works through stale backlog — it always acts on the
/// newest frame — and memory stays bounded no matter how far behind the
/// consumer falls.
pub struct FrameIntake {
    slot: Mutex<Option<DepthFrame>>,
    available: Condvar,
}

impl FrameIntake {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            available: Condvar::new(),
        }
    }

    /// Deposit a frame. Never blocks and never fails.
    ///
    /// Returns `true` when an unconsumed frame was displaced — the
    /// deliberate drop-stale policy in action.
    pub fn push(&self, frame: DepthFrame) -> bool {
        let displaced = {
            let mut slot = self.slot.lock();
            slot.replace(frame).is_some()
        };
        self.available.notify_one();
        displaced
    }

    /// Remove and return the most recent frame, waiting up to `timeout` for
    /// one to arrive. Returns `None` if the window elapses with the slot
    /// still empty.
    pub fn take_latest(&self, timeout: Duration) -> Option<DepthFrame> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.slot.lock();
        loop {
            if let Some(frame) = slot.take() {
                return Some(frame);
            }
            if self.available.wait_until(&mut slot, deadline).timed_out() {
                return slot.take();
            }
        }
    }

    /// Whether a frame is currently waiting.
    pub fn has_frame(&self) -> bool {
        self.slot.lock().is_some()
    }
}

impl Default for FrameIntake {
    fn default() -> Self {
        Self::new()
    }
}
