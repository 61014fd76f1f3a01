use serde::{Deserialize, Serialize};

use crate::pipeline::transform::TransformConfig;

/// Everything tunable about a pipeline run, as stored on disk.
///
/// Unknown fields in the file are ignored and missing fields fall back to
/// the defaults, so a hand-edited file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineSettings {
    /// Side length of the square tile/motor grid.
    pub tiles_per_side: usize,
    /// Maximum depth of interest in meters; greater distances read as
    /// out of range.
    pub max_depth_m: f32,
    /// Minimum per-point confidence for a depth reading to be trusted.
    pub min_confidence: u16,
    /// Frames a consumer queue holds before deliveries start dropping.
    pub consumer_queue_capacity: usize,
    /// Milliseconds a consumer waits for a frame before winding down.
    pub idle_timeout_ms: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            tiles_per_side: 3,
            max_depth_m: 1.5,
            min_confidence: 10,
            consumer_queue_capacity: 4,
            idle_timeout_ms: 1000,
        }
    }
}

impl PipelineSettings {
    /// The transform configuration these settings describe.
    pub fn transform_config(&self) -> TransformConfig {
        TransformConfig {
            tiles_per_side: self.tiles_per_side,
            max_depth_m: self.max_depth_m,
            min_confidence: self.min_confidence,
        }
    }

    pub fn idle_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.idle_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_transform_defaults() {
        let settings = PipelineSettings::default();
        assert_eq!(settings.transform_config(), TransformConfig::default());
        assert_eq!(settings.idle_timeout_ms, 1000);
        assert_eq!(settings.consumer_queue_capacity, 4);
    }

    #[test]
    fn serialises_to_camel_case() {
        let json = serde_json::to_value(PipelineSettings::default()).unwrap();
        assert_eq!(json["tilesPerSide"], 3);
        assert_eq!(json["minConfidence"], 10);
        assert_eq!(json["idleTimeoutMs"], 1000);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let settings: PipelineSettings = serde_json::from_str(r#"{"maxDepthM": 2.5}"#).unwrap();
        assert_eq!(settings.max_depth_m, 2.5);
        assert_eq!(settings.tiles_per_side, 3);
    }

    #[test]
    fn round_trips_through_json() {
        let original = PipelineSettings {
            tiles_per_side: 4,
            max_depth_m: 2.0,
            min_confidence: 25,
            consumer_queue_capacity: 8,
            idle_timeout_ms: 500,
        };
        let json = serde_json::to_string(&original).unwrap();
        let restored: PipelineSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(original, restored);
    }
}
