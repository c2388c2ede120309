//! # vegscan core
//!
//! Core types and I/O for the vegscan vegetation change-detection tools.
//!
//! This crate provides:
//! - `Raster<T>`: georeferenced single-band raster grid
//! - `GeoTransform` / `BoundingBox`: georeferencing and extent reasoning
//! - `Scene`: Landsat scene identity and revisit arithmetic
//! - `SceneMetadata`: MTL calibration metadata parsing
//! - raster I/O and the geoprocessing provider interface

pub mod crs;
pub mod error;
pub mod io;
pub mod metadata;
pub mod raster;
pub mod scene;

pub use crs::Crs;
pub use error::{Error, Result};
pub use metadata::{CalibrationParameters, SceneMetadata};
pub use raster::{BoundingBox, GeoTransform, Raster, RasterElement};
pub use scene::Scene;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::Crs;
    pub use crate::error::{Error, Result};
    pub use crate::io::GeoProvider;
    pub use crate::raster::{BoundingBox, GeoTransform, Raster, RasterElement};
    pub use crate::scene::Scene;
}
