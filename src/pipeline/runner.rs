use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::diagnostics::stats::{PipelineSnapshot, PipelineStats};
use crate::pipeline::cancel::ShutdownToken;
use crate::pipeline::intake::FrameIntake;
use crate::pipeline::registry::{FrameSink, ListenerRegistry};
use crate::pipeline::transform::DepthTransform;
use crate::pipeline::types::{GreyscaleFrame, TileGrid};
use crate::source::backend::FrameListener;
use crate::source::types::DepthFrame;

/// Default wait per intake poll. Purely a liveness interval: an empty poll
/// means "nothing new yet", never shutdown — that comes from the token.
const DEFAULT_FRAME_WAIT: Duration = Duration::from_millis(100);

/// The orchestration stage: freshest frame in, both artifacts fanned out.
///
/// Owns the intake cell, the transform, and the listener registry. A
/// dedicated thread drains the intake to the newest frame, runs the
/// transform, and publishes the results to every registered listener.
pub struct Pipeline {
    intake: Arc<FrameIntake>,
    registry: Arc<ListenerRegistry>,
    stats: Arc<Mutex<PipelineStats>>,
    shutdown: ShutdownToken,
    frame_wait: Duration,
    transform: Option<DepthTransform>,
    thread: Option<JoinHandle<()>>,
}

impl Pipeline {
    pub fn new(transform: DepthTransform, shutdown: ShutdownToken) -> Self {
        Self {
            intake: Arc::new(FrameIntake::new()),
            registry: Arc::new(ListenerRegistry::new()),
            stats: Arc::new(Mutex::new(PipelineStats::new())),
            shutdown,
            frame_wait: DEFAULT_FRAME_WAIT,
            transform: Some(transform),
            thread: None,
        }
    }

    /// Override the intake poll interval (shortened in tests).
    pub fn with_frame_wait(mut self, frame_wait: Duration) -> Self {
        self.frame_wait = frame_wait;
        self
    }

    /// The listener to register with the frame source. Frames it receives
    /// land in the intake without ever blocking the source's thread.
    pub fn listener(&self) -> PipelineListener {
        PipelineListener {
            intake: Arc::clone(&self.intake),
            stats: Arc::clone(&self.stats),
        }
    }

    pub fn add_greyscale_listener(&self, sink: Arc<dyn FrameSink<GreyscaleFrame>>) {
        self.registry.add_greyscale_listener(sink);
    }

    pub fn add_tile_listener(&self, sink: Arc<dyn FrameSink<TileGrid>>) {
        self.registry.add_tile_listener(sink);
    }

    /// Spawn the orchestration thread. Call once.
    pub fn start(&mut self) {
        let Some(transform) = self.transform.take() else {
            warn!("pipeline already started");
            return;
        };
        let intake = Arc::clone(&self.intake);
        let registry = Arc::clone(&self.registry);
        let stats = Arc::clone(&self.stats);
        let shutdown = self.shutdown.clone();
        let frame_wait = self.frame_wait;

        info!(
            "pipeline starting: {} greyscale / {} tile listeners",
            registry.greyscale_listener_count(),
            registry.tile_listener_count()
        );

        let handle = std::thread::Builder::new()
            .name("pipeline".to_string())
            .spawn(move || {
                while !shutdown.is_triggered() {
                    let Some(frame) = intake.take_latest(frame_wait) else {
                        continue;
                    };
                    let started = Instant::now();
                    let (grey, grid) = transform.apply(&frame);
                    registry.publish(Arc::new(grey), Arc::new(grid));
                    stats.lock().record_cycle(started.elapsed());
                }
                debug!("pipeline thread exiting");
            })
            .expect("failed to spawn pipeline thread");
        self.thread = Some(handle);
    }

    /// Trigger shutdown and wait for the orchestration thread.
    pub fn stop(&mut self) {
        self.shutdown.trigger();
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }

    /// Take a snapshot of the throughput counters.
    pub fn diagnostics(&self) -> PipelineSnapshot {
        self.stats.lock().snapshot()
    }
}

/// Producer-side handle: accepts frames from the source callback.
pub struct PipelineListener {
    intake: Arc<FrameIntake>,
    stats: Arc<Mutex<PipelineStats>>,
}

impl FrameListener for PipelineListener {
    fn on_new_frame(&self, frame: DepthFrame) {
        let displaced = self.intake.push(frame);
        let mut stats = self.stats.lock();
        stats.record_arrival();
        if displaced {
            stats.record_stale_drop();
        }
    }
}
