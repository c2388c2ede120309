//! Raster I/O and the geoprocessing provider interface
//!
//! GeoTIFF read/write is feature-switched: the `gdal` feature uses GDAL for
//! full metadata support, otherwise a native `tiff`-based fallback is used.
//! The heavier geometric primitives (warp, sieve, polygonize) are only
//! consumed through [`GeoProvider`], so the pipeline never calls GDAL
//! directly and tests can substitute their own provider.

#[cfg(feature = "gdal")]
mod gdal_io;
#[cfg(not(feature = "gdal"))]
mod native;

#[cfg(feature = "gdal")]
pub use gdal_io::{read_geotiff, write_geotiff, GdalProvider, GeoTiffOptions};

#[cfg(not(feature = "gdal"))]
pub use native::{read_geotiff, write_geotiff, GeoTiffOptions};

use crate::crs::Crs;
use crate::error::Result;
use crate::raster::BoundingBox;
use std::path::Path;

/// The narrow interface to the external raster/vector geoprocessing
/// library.
///
/// All operations are filesystem-mediated: they read a source raster from
/// durable storage and write their result next to it. Failures are
/// deterministic, so callers propagate them unchanged instead of retrying.
pub trait GeoProvider {
    /// Resample `src` onto the given bounding box and write it to `dst`,
    /// preserving pixel size and spatial reference.
    fn warp_to_bounds(&self, src: &Path, bounds: &BoundingBox, dst: &Path) -> Result<()>;

    /// Remove connected components smaller than `min_pixels` from a mask
    /// raster, writing the cleaned mask to `dst`.
    fn sieve(&self, src: &Path, dst: &Path, min_pixels: usize) -> Result<()>;

    /// Convert a mask raster to polygons, keeping only features whose class
    /// attribute equals `keep_class`, reprojected to `target`.
    fn polygonize(&self, src: &Path, dst: &Path, keep_class: i32, target: &Crs) -> Result<()>;
}
