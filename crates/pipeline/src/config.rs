//! Pipeline configuration
//!
//! Every tunable the pipeline consults lives in one structure handed to the
//! orchestrator at construction, so tests can vary thresholds without any
//! process-wide state.

use serde::{Deserialize, Serialize};
use vegscan_algorithms::indices::LANDSAT8_CLOUD_CODES;

/// Configuration for one change-detection run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Days between repeat acquisitions of the same footprint
    pub revisit_days: u32,
    /// Band number providing the index reference (red)
    pub reference_band: u8,
    /// Band number providing the index response (near infrared)
    pub response_band: u8,
    /// Band number guarding against low-signal surfaces (shortwave infrared)
    pub auxiliary_band: u8,
    /// Quality-band codes that zero the index
    pub cloud_codes: Vec<u16>,
    /// Auxiliary reflectance below which the index is zeroed
    pub low_signal_threshold: f32,
    /// Index drop at or below which a pixel counts as vegetation loss
    pub change_threshold: f32,
    /// Connected components smaller than this many pixels are noise
    pub sieve_min_pixels: usize,
    /// EPSG code of the CRS for vectorized output
    pub target_epsg: u32,
    /// Edge length of calibration processing tiles
    pub tile_size: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            revisit_days: 16,
            reference_band: 4,
            response_band: 5,
            auxiliary_band: 6,
            cloud_codes: LANDSAT8_CLOUD_CODES.to_vec(),
            low_signal_threshold: 0.1,
            change_threshold: -0.08,
            // 33 pixels is roughly 30000 square metres at 30 m resolution
            sieve_min_pixels: 33,
            target_epsg: 4674,
            tile_size: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = DetectionConfig::default();
        assert_eq!(cfg.revisit_days, 16);
        assert_eq!(cfg.cloud_codes.len(), 18);
        assert_eq!(cfg.change_threshold, -0.08);
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let cfg: DetectionConfig =
            serde_json::from_str(r#"{"change_threshold": -0.12, "sieve_min_pixels": 10}"#)
                .unwrap();
        assert_eq!(cfg.change_threshold, -0.12);
        assert_eq!(cfg.sieve_min_pixels, 10);
        assert_eq!(cfg.revisit_days, 16);
    }
}
