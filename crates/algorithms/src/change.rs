//! Temporal differencing and thresholding
//!
//! Turns two co-registered index rasters into a binary vegetation-loss
//! mask. Zero is the index engine's nodata sentinel, so a zero pixel in
//! either raster zeroes the difference rather than producing a spurious
//! change value; a genuinely zero index is indistinguishable from missing
//! data here, an accepted information loss inherited from the index format.

use crate::maybe_rayon::*;
use ndarray::Array2;
use vegscan_core::raster::Raster;
use vegscan_core::{Error, Result};

/// Parameters for change-mask extraction
#[derive(Debug, Clone)]
pub struct ChangeParams {
    /// Index-difference threshold: pixels at or below it count as loss.
    /// A meaningful vegetation drop is a small negative number.
    pub threshold: f32,
}

impl Default for ChangeParams {
    fn default() -> Self {
        Self { threshold: -0.08 }
    }
}

/// Difference two index rasters pixel-wise: `current - previous`, with the
/// zero-sentinel nodata rule applied. Grids must match exactly.
pub fn difference(current: &Raster<f32>, previous: &Raster<f32>) -> Result<Raster<f32>> {
    if !current.same_grid(previous) {
        return Err(Error::GridMismatch {
            expected_rows: current.rows(),
            expected_cols: current.cols(),
            actual_rows: previous.rows(),
            actual_cols: previous.cols(),
        });
    }

    let (rows, cols) = current.shape();

    let data: Vec<f32> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![0.0f32; cols];
            for col in 0..cols {
                let a = unsafe { current.get_unchecked(row, col) };
                let b = unsafe { previous.get_unchecked(row, col) };
                if a != 0.0 && b != 0.0 {
                    row_data[col] = a - b;
                }
            }
            row_data
        })
        .collect();

    let mut output = current.with_same_meta::<f32>(rows, cols);
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(output)
}

/// Binarize a difference raster: 1 where the value is at or below the
/// threshold (vegetation loss), 0 elsewhere.
pub fn threshold_mask(diff: &Raster<f32>, params: &ChangeParams) -> Result<Raster<u8>> {
    let (rows, cols) = diff.shape();
    let threshold = params.threshold;

    let data: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![0u8; cols];
            for col in 0..cols {
                let v = unsafe { diff.get_unchecked(row, col) };
                if v <= threshold {
                    row_data[col] = 1;
                }
            }
            row_data
        })
        .collect();

    let mut output = diff.with_same_meta::<u8>(rows, cols);
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use vegscan_core::GeoTransform;

    fn index_raster(rows: usize, cols: usize, value: f32) -> Raster<f32> {
        let mut r = Raster::filled(rows, cols, value);
        r.set_transform(GeoTransform::new(0.0, rows as f64 * 30.0, 30.0, -30.0));
        r
    }

    #[test]
    fn test_difference() {
        let current = index_raster(5, 5, 0.3);
        let previous = index_raster(5, 5, 0.5);

        let diff = difference(&current, &previous).unwrap();
        assert_relative_eq!(diff.get(2, 2).unwrap(), -0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_sentinel_propagates() {
        let mut current = index_raster(5, 5, 0.4);
        let mut previous = index_raster(5, 5, 0.6);
        current.set(1, 1, 0.0).unwrap();
        previous.set(3, 3, 0.0).unwrap();

        let diff = difference(&current, &previous).unwrap();
        assert_eq!(diff.get(1, 1).unwrap(), 0.0);
        assert_eq!(diff.get(3, 3).unwrap(), 0.0);
        assert_relative_eq!(diff.get(2, 2).unwrap(), -0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_identical_rasters_diff_to_zero() {
        let mut a = index_raster(6, 6, 0.0);
        for i in 0..6 {
            for j in 0..6 {
                a.set(i, j, 0.1 + (i * 6 + j) as f32 * 0.01).unwrap();
            }
        }

        let diff = difference(&a, &a.clone()).unwrap();
        for i in 0..6 {
            for j in 0..6 {
                assert_eq!(diff.get(i, j).unwrap(), 0.0);
            }
        }
    }

    #[test]
    fn test_grid_mismatch() {
        let a = index_raster(5, 5, 0.3);
        let b = index_raster(6, 5, 0.3);
        assert!(matches!(
            difference(&a, &b),
            Err(Error::GridMismatch { .. })
        ));
    }

    #[test]
    fn test_threshold_mask() {
        let mut diff = index_raster(3, 3, 0.0);
        diff.set(0, 0, -0.09).unwrap();
        diff.set(0, 1, -0.05).unwrap();
        diff.set(0, 2, -0.08).unwrap();
        diff.set(1, 0, 0.12).unwrap();

        let mask = threshold_mask(&diff, &ChangeParams::default()).unwrap();
        assert_eq!(mask.get(0, 0).unwrap(), 1); // below threshold
        assert_eq!(mask.get(0, 1).unwrap(), 0); // above threshold
        assert_eq!(mask.get(0, 2).unwrap(), 1); // at threshold counts
        assert_eq!(mask.get(1, 0).unwrap(), 0); // gain, not loss
    }

    #[test]
    fn test_mask_keeps_georeferencing() {
        let diff = index_raster(4, 4, -0.5);
        let mask = threshold_mask(&diff, &ChangeParams::default()).unwrap();
        assert_eq!(mask.transform(), diff.transform());
        assert_eq!(mask.get(0, 0).unwrap(), 1);
    }
}
