//! Change-detection orchestrator
//!
//! Sequences calibration, index computation, alignment, differencing,
//! denoising and optional vectorization for one scene. The orchestrator
//! holds only paths and state; raster data lives in stage-local variables
//! and every intermediate artifact is removed once a terminal state is
//! reached.

use std::path::PathBuf;
use tracing::{info, warn};

use vegscan_algorithms::calibration::{toa_reflectance, ToaParams};
use vegscan_algorithms::change::{difference, threshold_mask, ChangeParams};
use vegscan_algorithms::indices::{masked_normalized_difference, IndexParams};
use vegscan_core::io::{read_geotiff, write_geotiff, GeoProvider};
use vegscan_core::{Crs, Error, Raster, Result, Scene, SceneMetadata};

use crate::config::DetectionConfig;
use crate::layout::SceneLayout;

/// Tolerance for treating two extents as identical, in map units
const EXTENT_EPSILON: f64 = 1e-6;

/// Which stages of the pipeline to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineTask {
    /// Calibrate and compute the index raster, then stop
    Index,
    /// Full run: index plus change detection against the comparison scene
    Detect {
        /// Vectorize the final mask instead of keeping the raster
        vectorize: bool,
    },
}

/// Pipeline progress; terminal states are `Done`, `Skipped` and `Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Calibrating,
    IndexComputed,
    Aligning,
    Differenced,
    Denoised,
    Vectorized,
    RasterFinal,
    Done,
    Skipped,
    Failed,
}

/// Terminal artifact of a pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Index raster only (no change detection requested)
    Index(PathBuf),
    /// Binary change-mask raster
    ChangeMask(PathBuf),
    /// Vectorized change polygons
    ChangePolygons(PathBuf),
    /// Change detection skipped: the comparison scene has no index yet
    Skipped,
}

/// Drives one scene through the pipeline
pub struct Orchestrator<'a, P> {
    config: DetectionConfig,
    provider: &'a P,
    base_dir: PathBuf,
    state: PipelineState,
    intermediates: Vec<PathBuf>,
}

impl<'a, P: GeoProvider> Orchestrator<'a, P> {
    pub fn new(config: DetectionConfig, provider: &'a P, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            provider,
            base_dir: base_dir.into(),
            state: PipelineState::Idle,
            intermediates: Vec::new(),
        }
    }

    /// Current pipeline state
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run the selected stages for one scene.
    ///
    /// Missing comparison input resolves to `Ok(Outcome::Skipped)`; every
    /// other failure is returned unchanged. Intermediate artifacts are
    /// removed whichever terminal state is reached.
    pub fn run(&mut self, scene: &Scene, task: PipelineTask) -> Result<Outcome> {
        let result = self.execute(scene, task);

        self.state = match &result {
            Ok(Outcome::Skipped) => PipelineState::Skipped,
            Ok(_) => PipelineState::Done,
            Err(_) => PipelineState::Failed,
        };
        self.cleanup();

        match &result {
            Ok(outcome) => info!(scene = %scene.display_name(), ?outcome, "pipeline finished"),
            Err(e) => warn!(scene = %scene.display_name(), error = %e, "pipeline failed"),
        }
        result
    }

    fn execute(&mut self, scene: &Scene, task: PipelineTask) -> Result<Outcome> {
        let layout = SceneLayout::new(&self.base_dir, scene);
        let index_path = self.compute_index(scene, &layout)?;

        match task {
            PipelineTask::Index => Ok(Outcome::Index(index_path)),
            PipelineTask::Detect { vectorize } => self.detect(scene, &layout, vectorize),
        }
    }

    /// Calibrate the configured bands and compute the masked index raster
    fn compute_index(&mut self, scene: &Scene, layout: &SceneLayout) -> Result<PathBuf> {
        self.state = PipelineState::Calibrating;
        info!(scene = %scene.display_name(), "calibrating bands to TOA reflectance");

        let meta = SceneMetadata::from_file(layout.metadata())?;
        let toa_params = ToaParams {
            tile_size: self.config.tile_size,
        };

        let bands = [
            self.config.response_band,
            self.config.reference_band,
            self.config.auxiliary_band,
        ];
        let mut calibrated = Vec::with_capacity(bands.len());
        for number in bands {
            let dn: Raster<u16> = read_geotiff(layout.band(number), None)?;
            let toa = toa_reflectance(&dn, &meta.calibration(number)?, &toa_params)?;

            let path = layout.toa_band(number);
            write_geotiff(&toa, &path, None)?;
            self.intermediates.push(path);
            calibrated.push(toa);
        }
        let [response, reference, auxiliary]: [Raster<f32>; 3] = calibrated
            .try_into()
            .map_err(|_| Error::Other("calibrated band count mismatch".to_string()))?;

        let quality: Raster<u16> = read_geotiff(layout.quality_band(), None)?;
        let params = IndexParams {
            cloud_codes: self.config.cloud_codes.clone(),
            low_signal_threshold: self.config.low_signal_threshold,
        };
        let index = masked_normalized_difference(
            &response,
            &reference,
            Some(&auxiliary),
            Some(&quality),
            &params,
        )?;

        let index_path = layout.index();
        write_geotiff(&index, &index_path, None)?;
        self.state = PipelineState::IndexComputed;
        info!(artifact = %index_path.display(), "index raster created");

        Ok(index_path)
    }

    /// Align the current and comparison index rasters, difference them and
    /// reduce the result to the final change artifact
    fn detect(&mut self, scene: &Scene, layout: &SceneLayout, vectorize: bool) -> Result<Outcome> {
        self.state = PipelineState::Aligning;

        let previous = scene.comparison(self.config.revisit_days);
        let prev_layout = SceneLayout::new(&self.base_dir, &previous);
        let prev_index_path = prev_layout.index();

        // The comparison scene may simply not have been processed yet;
        // that is a reported skip, not an error.
        if !prev_index_path.is_file() {
            info!(
                comparison = %previous.display_name(),
                "comparison index raster not found; change detection skipped"
            );
            return Ok(Outcome::Skipped);
        }

        let index_path = layout.index();
        let current: Raster<f32> = read_geotiff(&index_path, None)?;
        let prev: Raster<f32> = read_geotiff(&prev_index_path, None)?;

        let (current, prev) = if current.bounds().approx_eq(&prev.bounds(), EXTENT_EPSILON) {
            (current, prev)
        } else {
            let common = current
                .bounds()
                .intersection(&prev.bounds())
                .ok_or_else(|| {
                    Error::Other(format!(
                        "index rasters of {} and {} do not overlap",
                        scene.display_name(),
                        previous.display_name()
                    ))
                })?;

            info!(scene = %scene.display_name(), "extents differ; resampling onto common extent");
            let current_warped = layout.index_warped();
            let prev_warped = prev_layout.index_warped();
            self.provider
                .warp_to_bounds(&index_path, &common, &current_warped)?;
            self.provider
                .warp_to_bounds(&prev_index_path, &common, &prev_warped)?;
            self.intermediates.push(current_warped.clone());
            self.intermediates.push(prev_warped.clone());

            (
                read_geotiff(&current_warped, None)?,
                read_geotiff(&prev_warped, None)?,
            )
        };

        let diff = difference(&current, &prev)?;
        let changes_path = layout.changes();
        write_geotiff(&diff, &changes_path, None)?;
        self.intermediates.push(changes_path);
        self.state = PipelineState::Differenced;

        let mask = threshold_mask(
            &diff,
            &ChangeParams {
                threshold: self.config.change_threshold,
            },
        )?;
        let mask_path = layout.changes_mask();
        write_geotiff(&mask, &mask_path, None)?;
        self.intermediates.push(mask_path.clone());

        let detection_path = layout.detection();
        self.provider
            .sieve(&mask_path, &detection_path, self.config.sieve_min_pixels)?;
        self.state = PipelineState::Denoised;
        info!(artifact = %detection_path.display(), "denoised change mask created");

        if vectorize {
            let vector_path = layout.detection_vector();
            self.provider.polygonize(
                &detection_path,
                &vector_path,
                1,
                &Crs::from_epsg(self.config.target_epsg),
            )?;
            // The raster mask is superseded by the vector artifact
            self.intermediates.push(detection_path);
            self.state = PipelineState::Vectorized;
            info!(artifact = %vector_path.display(), "change polygons created");
            Ok(Outcome::ChangePolygons(vector_path))
        } else {
            self.state = PipelineState::RasterFinal;
            Ok(Outcome::ChangeMask(detection_path))
        }
    }

    /// Remove every intermediate artifact recorded during the run
    fn cleanup(&mut self) {
        for path in self.intermediates.drain(..) {
            if path.is_file() {
                if let Err(e) = std::fs::remove_file(&path) {
                    warn!(path = %path.display(), error = %e, "could not remove intermediate");
                }
            }
        }
    }
}
