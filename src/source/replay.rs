use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, info};

use crate::source::backend::{DepthSource, FrameListener};
use crate::source::error::{Result, SourceError};
use crate::source::types::DepthFrame;

/// Plays a prepared sequence of frames at a fixed interval.
///
/// Stands in for both a recording replay and a camera during development:
/// frames are delivered on a dedicated thread, exactly as a live SDK would
/// invoke its data callback. When the sequence runs out the thread exits
/// and no further frames arrive — downstream consumers then idle out the
/// same way they would at the end of a recording.
pub struct ReplaySource {
    frames: Vec<DepthFrame>,
    frame_interval: Duration,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ReplaySource {
    /// Create a replay over `frames`, delivered one per `frame_interval`.
    pub fn new(frames: Vec<DepthFrame>, frame_interval: Duration) -> Self {
        Self {
            frames,
            frame_interval,
            running: Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }

    /// Whether the delivery thread is still running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Block until the whole sequence has been delivered (or capture was
    /// stopped), then reap the delivery thread.
    pub fn wait(&mut self) {
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
        self.running.store(false, Ordering::Relaxed);
    }
}

impl DepthSource for ReplaySource {
    fn start_capture(&mut self, listener: Arc<dyn FrameListener>) -> Result<()> {
        if self.thread.is_some() {
            return Err(SourceError::AlreadyCapturing);
        }
        if self.frames.is_empty() {
            return Err(SourceError::Unavailable("replay holds no frames".to_string()));
        }

        let frames = self.frames.clone();
        let interval = self.frame_interval;
        let running = Arc::clone(&self.running);
        running.store(true, Ordering::Relaxed);

        let handle = std::thread::Builder::new()
            .name("replay-source".to_string())
            .spawn(move || {
                info!("replay starting: {} frames at {:?} interval", frames.len(), interval);
                let start = std::time::Instant::now();
                for (seq, mut frame) in frames.into_iter().enumerate() {
                    if !running.load(Ordering::Relaxed) {
                        debug!("replay stopped after {seq} frames");
                        break;
                    }
                    frame.timestamp_us = start.elapsed().as_micros() as u64;
                    listener.on_new_frame(frame);
                    std::thread::sleep(interval);
                }
                running.store(false, Ordering::Relaxed);
                debug!("replay thread exiting");
            })
            .map_err(|e| SourceError::Unavailable(format!("failed to spawn replay thread: {e}")))?;

        self.thread = Some(handle);
        Ok(())
    }

    fn stop_capture(&mut self) -> Result<()> {
        if self.thread.is_none() {
            return Err(SourceError::NotCapturing);
        }
        self.running.store(false, Ordering::Relaxed);
        self.wait();
        Ok(())
    }
}
