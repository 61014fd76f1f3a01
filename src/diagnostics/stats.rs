use serde::Serialize;
use std::time::{Duration, Instant};

/// Collects throughput statistics for a running pipeline.
pub struct PipelineStats {
    frames_in: u64,
    frames_transformed: u64,
    stale_drops: u64,
    start_time: Instant,
    last_cycle_us: u64,
    total_cycle_us: u64,
}

/// Snapshot of pipeline stats for logging or serialisation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSnapshot {
    pub fps: f64,
    pub frames_in: u64,
    pub frames_transformed: u64,
    pub stale_drops: u64,
    pub stale_drop_rate: f64,
    pub last_cycle_ms: f64,
    pub avg_cycle_ms: f64,
}

impl PipelineStats {
    /// Create new stats with zeroed counters.
    pub fn new() -> Self {
        Self {
            frames_in: 0,
            frames_transformed: 0,
            stale_drops: 0,
            start_time: Instant::now(),
            last_cycle_us: 0,
            total_cycle_us: 0,
        }
    }

    /// Record a frame arriving from the source.
    pub fn record_arrival(&mut self) {
        self.frames_in += 1;
    }

    /// Record a frame displaced unconsumed — the drop-stale policy firing.
    pub fn record_stale_drop(&mut self) {
        self.stale_drops += 1;
    }

    /// Record one completed transform pass and how long it took.
    pub fn record_cycle(&mut self, elapsed: Duration) {
        self.frames_transformed += 1;
        self.last_cycle_us = elapsed.as_micros() as u64;
        self.total_cycle_us += self.last_cycle_us;
    }

    /// Transformed frames per second since the stats began.
    pub fn fps(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed < 0.001 {
            return 0.0;
        }
        self.frames_transformed as f64 / elapsed
    }

    /// Share of arrived frames displaced before processing (0.0 - 100.0).
    pub fn stale_drop_rate(&self) -> f64 {
        if self.frames_in == 0 {
            return 0.0;
        }
        (self.stale_drops as f64 / self.frames_in as f64) * 100.0
    }

    /// Mean transform pass duration in milliseconds.
    pub fn avg_cycle_ms(&self) -> f64 {
        if self.frames_transformed == 0 {
            return 0.0;
        }
        self.total_cycle_us as f64 / self.frames_transformed as f64 / 1000.0
    }

    /// Take a serialisable snapshot.
    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            fps: self.fps(),
            frames_in: self.frames_in,
            frames_transformed: self.frames_transformed,
            stale_drops: self.stale_drops,
            stale_drop_rate: self.stale_drop_rate(),
            last_cycle_ms: self.last_cycle_us as f64 / 1000.0,
            avg_cycle_ms: self.avg_cycle_ms(),
        }
    }
}

impl Default for PipelineStats {
    fn default() -> Self {
        Self::new()
    }
}
