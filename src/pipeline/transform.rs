use crate::pipeline::error::{ConfigError, Result};
use crate::pipeline::types::{GreyscaleFrame, TileGrid};
use crate::source::types::{DepthFrame, DepthPoint};

/// Number of equal-width intensity bins per tile histogram.
const DEPTH_BINS: usize = 5;

/// Minimum cumulative pixel count a bin must exceed before its intensity is
/// accepted as a tile's closest object — smaller blobs might be noise.
const MIN_OBJECT_PIXELS: u32 = 90;

/// Pixel value for out-of-range and low-confidence points. Reads as
/// "farthest possible" everywhere downstream.
const OUT_OF_RANGE: u8 = 255;

/// Tuning for one transform instance. Immutable for the engine's lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformConfig {
    /// Side length of the square tile grid (one tile per motor).
    pub tiles_per_side: usize,
    /// Distances beyond this many meters are out of range.
    pub max_depth_m: f32,
    /// Points at or below this confidence are treated as unreliable.
    pub min_confidence: u16,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            tiles_per_side: 3,
            max_depth_m: 1.5,
            min_confidence: 10,
        }
    }
}

/// Turns one depth frame into a greyscale image and a tile grid.
///
/// The greyscale image maps each point's distance linearly onto 0..=255
/// within the configured range; unreliable and out-of-range points both
/// saturate to 255, so the two are indistinguishable downstream (a known
/// property of the mapping, not a bug). The tile grid reduces each spatial
/// region of the image to the intensity of the closest thing in it that is
/// big enough not to be noise.
pub struct DepthTransform {
    config: TransformConfig,
}

impl DepthTransform {
    /// Create a transform, rejecting configurations that would mis-tile or
    /// divide by zero.
    pub fn new(config: TransformConfig) -> Result<Self> {
        if config.tiles_per_side == 0 {
            return Err(ConfigError::ZeroTiles);
        }
        if config.max_depth_m <= 0.0 {
            return Err(ConfigError::NonPositiveMaxDepth(config.max_depth_m));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Process one frame into both derived outputs.
    pub fn apply(&self, frame: &DepthFrame) -> (GreyscaleFrame, TileGrid) {
        let tiles = self.config.tiles_per_side;
        // Tiles are deliberately oversized: the final row/column of the
        // grid ends up short (or, for tiny frames, empty and therefore 0).
        let tile_width = frame.width / tiles + 1;
        let tile_height = frame.height / tiles + 1;

        let mut pixels = vec![0u8; frame.width * frame.height];
        let mut histograms = vec![[0u32; DEPTH_BINS]; tiles * tiles];

        for y in 0..frame.height {
            for x in 0..frame.width {
                let shade = self.shade(frame.point(x, y));
                pixels[y * frame.width + x] = shade;

                let tile_idx = (y / tile_height) * tiles + x / tile_width;
                histograms[tile_idx][bin_index(shade)] += 1;
            }
        }

        let cells = histograms
            .iter()
            .map(|histogram| closest_object(histogram).unwrap_or(0))
            .collect();

        (
            GreyscaleFrame {
                width: frame.width,
                height: frame.height,
                pixels,
                timestamp_us: frame.timestamp_us,
            },
            TileGrid::new(tiles, cells, frame.timestamp_us),
        )
    }

    /// Map one point to its greyscale intensity.
    ///
    /// The confidence check comes first: an unreliable point is out of
    /// range no matter how close its depth reading claims to be.
    fn shade(&self, point: DepthPoint) -> u8 {
        if point.confidence <= self.config.min_confidence {
            return OUT_OF_RANGE;
        }
        let scaled = point.depth_m / self.config.max_depth_m * 255.0;
        scaled.clamp(0.0, 255.0) as u8
    }
}

/// Histogram bin for an intensity: 5 equal-width bins over 0..=255.
fn bin_index(intensity: u8) -> usize {
    intensity as usize * DEPTH_BINS / 256
}

/// Lowest intensity covered by a bin: 0, 51, 102, 153, 204.
fn bin_floor(bin: usize) -> u8 {
    (bin * 256 / DEPTH_BINS) as u8
}

/// The intensity of the closest accepted object in a tile.
///
/// Walks bins from near to far accumulating the pixel count; the first bin
/// at which the running total exceeds [`MIN_OBJECT_PIXELS`] wins, valued at
/// its near edge. `None` when the tile never accumulates enough pixels —
/// published as 0, but kept distinct here so callers can tell "empty tile"
/// from "object at distance 0".
fn closest_object(histogram: &[u32; DEPTH_BINS]) -> Option<u8> {
    let mut cumulative = 0u32;
    for (bin, &count) in histogram.iter().enumerate() {
        cumulative += count;
        if cumulative > MIN_OBJECT_PIXELS {
            return Some(bin_floor(bin));
        }
    }
    None
}
