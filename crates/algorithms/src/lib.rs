//! # vegscan algorithms
//!
//! Pure raster algebra for the vegscan change-detection pipeline:
//!
//! - **calibration**: digital numbers to TOA reflectance, tiled
//! - **indices**: normalized difference with quality-mask overrides
//! - **change**: temporal differencing and threshold masking
//!
//! All functions take owned raster grids and return new ones; nothing here
//! touches the filesystem or the geoprocessing provider.

pub mod calibration;
pub mod change;
pub mod indices;
mod maybe_rayon;
pub mod tiles;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::calibration::{toa_reflectance, ToaParams};
    pub use crate::change::{difference, threshold_mask, ChangeParams};
    pub use crate::indices::{
        masked_normalized_difference, normalized_difference, IndexParams, LANDSAT8_CLOUD_CODES,
    };
    pub use vegscan_core::prelude::*;
}
