//! Spectral index engine
//!
//! Normalized difference of two calibrated bands with per-pixel quality
//! overrides. The pipeline uses it as NDVI (NIR response, red reference),
//! but nothing here is band-specific.
//!
//! Override precedence per pixel:
//! 1. quality-mask code in the cloud/cirrus set -> 0
//! 2. auxiliary band below the low-signal threshold -> 0
//! 3. zero-sum denominator -> 0 (carries no information, not an error)
//! 4. otherwise `(response - reference) / (response + reference)`

use crate::maybe_rayon::*;
use ndarray::Array2;
use vegscan_core::raster::Raster;
use vegscan_core::{Error, Result};

/// Landsat 8 BQA codes flagging cloud or cirrus at medium/high confidence
pub const LANDSAT8_CLOUD_CODES: [u16; 18] = [
    61440, 59424, 57344, 56320, 53248, 52256, 52224, 49184, 49152, 48128, 45056, 43040, 39936,
    36896, 36864, 32768, 31744, 28672,
];

/// Parameters for masked index computation
#[derive(Debug, Clone)]
pub struct IndexParams {
    /// Quality-band codes that force the index to zero
    pub cloud_codes: Vec<u16>,
    /// Auxiliary-band reflectance below which the index is forced to zero,
    /// guarding against spurious values over non-vegetated surfaces
    pub low_signal_threshold: f32,
}

impl Default for IndexParams {
    fn default() -> Self {
        Self {
            cloud_codes: LANDSAT8_CLOUD_CODES.to_vec(),
            low_signal_threshold: 0.1,
        }
    }
}

/// Compute the normalized difference of two bands without quality masking:
/// `(response - reference) / (response + reference)`, zero where the
/// denominator is zero.
pub fn normalized_difference(
    response: &Raster<f32>,
    reference: &Raster<f32>,
) -> Result<Raster<f32>> {
    masked_normalized_difference(response, reference, None, None, &IndexParams::default())
}

/// Compute a normalized difference index with quality-mask and low-signal
/// overrides.
///
/// All supplied rasters must share one pixel grid; the check runs before
/// any per-pixel work. Each output pixel depends only on the co-located
/// input pixels, so rows are processed independently.
pub fn masked_normalized_difference(
    response: &Raster<f32>,
    reference: &Raster<f32>,
    auxiliary: Option<&Raster<f32>>,
    quality: Option<&Raster<u16>>,
    params: &IndexParams,
) -> Result<Raster<f32>> {
    check_grid(response, reference)?;
    if let Some(aux) = auxiliary {
        check_grid(response, aux)?;
    }
    if let Some(qa) = quality {
        check_grid(response, qa)?;
    }

    let (rows, cols) = response.shape();

    let data: Vec<f32> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![0.0f32; cols];
            for col in 0..cols {
                if let Some(qa) = quality {
                    let code = unsafe { qa.get_unchecked(row, col) };
                    if params.cloud_codes.contains(&code) {
                        continue;
                    }
                }
                if let Some(aux) = auxiliary {
                    let signal = unsafe { aux.get_unchecked(row, col) };
                    if signal < params.low_signal_threshold {
                        continue;
                    }
                }

                let a = unsafe { response.get_unchecked(row, col) };
                let b = unsafe { reference.get_unchecked(row, col) };

                let sum = a + b;
                if sum != 0.0 {
                    row_data[col] = (a - b) / sum;
                }
            }
            row_data
        })
        .collect();

    let mut output = response.with_same_meta::<f32>(rows, cols);
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(output)
}

fn check_grid<U, V>(a: &Raster<U>, b: &Raster<V>) -> Result<()>
where
    U: vegscan_core::RasterElement,
    V: vegscan_core::RasterElement,
{
    if !a.same_grid(b) {
        return Err(Error::GridMismatch {
            expected_rows: a.rows(),
            expected_cols: a.cols(),
            actual_rows: b.rows(),
            actual_cols: b.cols(),
        });
    }
    Ok(())
}
