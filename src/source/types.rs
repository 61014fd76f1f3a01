/// One measured point of a depth frame.
///
/// `depth_m` is the distance from the sensor in meters. `confidence` is the
/// sensor's per-point reliability score; higher is better, 0 means the
/// sensor saw nothing usable at that position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthPoint {
    pub depth_m: f32,
    pub confidence: u16,
}

/// A single captured depth frame.
///
/// Points are stored row-major, `width * height` of them. A frame is built
/// once by the source and never mutated afterwards; ownership moves through
/// the intake into the transform stage.
#[derive(Debug, Clone)]
pub struct DepthFrame {
    pub width: usize,
    pub height: usize,
    pub points: Vec<DepthPoint>,
    /// Capture timestamp in microseconds.
    pub timestamp_us: u64,
}

impl DepthFrame {
    /// Create a frame from row-major points.
    ///
    /// The point count must match `width * height`.
    pub fn new(width: usize, height: usize, points: Vec<DepthPoint>, timestamp_us: u64) -> Self {
        debug_assert_eq!(points.len(), width * height, "point count must match dimensions");
        Self {
            width,
            height,
            points,
            timestamp_us,
        }
    }

    /// Create a frame with every point at the same depth and confidence.
    pub fn filled(width: usize, height: usize, depth_m: f32, confidence: u16) -> Self {
        let points = vec![
            DepthPoint {
                depth_m,
                confidence,
            };
            width * height
        ];
        Self::new(width, height, points, 0)
    }

    /// The point at `(x, y)`.
    pub fn point(&self, x: usize, y: usize) -> DepthPoint {
        self.points[y * self.width + x]
    }
}
