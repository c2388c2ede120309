//! Scene directory layout
//!
//! The archive/layout collaborator drops each extracted scene into a
//! directory named after its identifier, holding per-band rasters and the
//! MTL metadata file. All artifact names the pipeline reads or writes are
//! derived here and nowhere else, so the naming convention stays in one
//! place.

use std::path::{Path, PathBuf};
use vegscan_core::Scene;

/// Resolves artifact paths for one scene within a base directory
#[derive(Debug, Clone)]
pub struct SceneLayout {
    dir: PathBuf,
    id: String,
}

impl SceneLayout {
    /// Layout for `scene` under `base_dir` (the directory containing one
    /// subdirectory per scene)
    pub fn new(base_dir: impl AsRef<Path>, scene: &Scene) -> Self {
        let id = scene.id();
        Self {
            dir: base_dir.as_ref().join(&id),
            id,
        }
    }

    /// The scene's own directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Raw digital-number band, e.g. `LC8..._B5.TIF`
    pub fn band(&self, number: u8) -> PathBuf {
        self.dir.join(format!("{}_B{}.TIF", self.id, number))
    }

    /// Quality-assessment band
    pub fn quality_band(&self) -> PathBuf {
        self.dir.join(format!("{}_BQA.TIF", self.id))
    }

    /// MTL metadata file
    pub fn metadata(&self) -> PathBuf {
        self.dir.join(format!("{}_MTL.txt", self.id))
    }

    /// Calibrated TOA reflectance for one band (intermediate)
    pub fn toa_band(&self, number: u8) -> PathBuf {
        self.dir.join(format!("{}_B{}_toa.tif", self.id, number))
    }

    /// Persisted index raster; next cycle's comparison input
    pub fn index(&self) -> PathBuf {
        self.dir.join(format!("{}_ndvi.tif", self.id))
    }

    /// Index raster resampled onto a shared extent (intermediate)
    pub fn index_warped(&self) -> PathBuf {
        self.dir.join(format!("{}_ndvi_warp.tif", self.id))
    }

    /// Raw index difference (intermediate)
    pub fn changes(&self) -> PathBuf {
        self.dir.join(format!("{}_changes.tif", self.id))
    }

    /// Thresholded change mask before denoising (intermediate)
    pub fn changes_mask(&self) -> PathBuf {
        self.dir.join(format!("{}_changes_mask.tif", self.id))
    }

    /// Final sieved change mask raster
    pub fn detection(&self) -> PathBuf {
        self.dir.join(format!("{}_detection.tif", self.id))
    }

    /// Final vectorized change artifact
    pub fn detection_vector(&self) -> PathBuf {
        self.dir.join(format!("{}_detection.geojson", self.id))
    }
}
