//! Radiometric calibration: digital numbers to TOA reflectance
//!
//! Landsat 8 conversion with sun-angle correction:
//!
//! `r = (M * DN + A) / cos(zenith)`
//!
//! with `M`/`A` the band-specific rescaling factors from the scene metadata
//! and `zenith` the solar zenith angle. Saturated pixels (r > 1) are clamped
//! to 1, never left unbounded.

use crate::maybe_rayon::*;
use crate::tiles::{Tile, TileIterator};
use vegscan_core::metadata::CalibrationParameters;
use vegscan_core::raster::Raster;
use vegscan_core::{Error, Result};

/// Upper reflectance bound; values above it are sensor saturation
const REFLECTANCE_MAX: f32 = 1.0;

/// Parameters for the calibration pass
#[derive(Debug, Clone)]
pub struct ToaParams {
    /// Edge length of the processing tiles
    pub tile_size: usize,
}

impl Default for ToaParams {
    fn default() -> Self {
        Self { tile_size: 256 }
    }
}

/// Convert a raw digital-number band to top-of-atmosphere reflectance.
///
/// The raster is processed in fixed-size tiles; every output pixel depends
/// only on its own input pixel, so the tiles partition the extent exactly
/// and can run in parallel. The input band is not modified.
///
/// A solar zenith angle at or beyond 90° makes the correction meaningless
/// (the sun is below the horizon) and fails before any pixel work.
pub fn toa_reflectance(
    band: &Raster<u16>,
    cal: &CalibrationParameters,
    params: &ToaParams,
) -> Result<Raster<f32>> {
    if !(0.0..90.0).contains(&cal.solar_zenith) {
        return Err(Error::InvalidParameter {
            name: "solar_zenith",
            value: cal.solar_zenith.to_string(),
            reason: "zenith must be in [0°, 90°) for reflectance correction".to_string(),
        });
    }

    let (rows, cols) = band.shape();
    let cos_zenith = cal.solar_zenith.to_radians().cos();
    let gain = cal.gain;
    let offset = cal.offset;

    let tiles: Vec<Tile> = TileIterator::new(rows, cols, params.tile_size).collect();

    let pieces: Vec<(Tile, Vec<f32>)> = tiles
        .into_par_iter()
        .map(|tile| {
            let mut values = Vec::with_capacity(tile.rows * tile.cols);
            for r in tile.row_off..tile.row_off + tile.rows {
                for c in tile.col_off..tile.col_off + tile.cols {
                    let dn = unsafe { band.get_unchecked(r, c) } as f64;
                    let toa = ((gain * dn + offset) / cos_zenith) as f32;
                    values.push(toa.min(REFLECTANCE_MAX));
                }
            }
            (tile, values)
        })
        .collect();

    let mut output = band.with_same_meta::<f32>(rows, cols);
    for (tile, values) in pieces {
        let mut i = 0;
        for r in tile.row_off..tile.row_off + tile.rows {
            for c in tile.col_off..tile.col_off + tile.cols {
                unsafe { output.set_unchecked(r, c, values[i]) };
                i += 1;
            }
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use vegscan_core::GeoTransform;

    fn cal(gain: f64, offset: f64, zenith: f64) -> CalibrationParameters {
        CalibrationParameters {
            gain,
            offset,
            solar_zenith: zenith,
        }
    }

    fn dn_band(rows: usize, cols: usize, value: u16) -> Raster<u16> {
        let mut r = Raster::filled(rows, cols, value);
        r.set_transform(GeoTransform::new(0.0, rows as f64 * 30.0, 30.0, -30.0));
        r
    }

    #[test]
    fn test_basic_conversion() {
        let band = dn_band(10, 10, 10000);
        let p = cal(2.0e-5, -0.1, 0.0);

        let toa = toa_reflectance(&band, &p, &ToaParams::default()).unwrap();
        // cos(0) = 1: r = 2e-5 * 10000 - 0.1 = 0.1
        assert_relative_eq!(toa.get(5, 5).unwrap(), 0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_sun_angle_correction() {
        let band = dn_band(4, 4, 10000);
        let p = cal(2.0e-5, -0.1, 60.0);

        let toa = toa_reflectance(&band, &p, &ToaParams::default()).unwrap();
        // cos(60°) = 0.5 doubles the reflectance
        assert_relative_eq!(toa.get(0, 0).unwrap(), 0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_saturation_clamps_to_one() {
        let band = dn_band(4, 4, u16::MAX);
        let p = cal(2.0e-5, -0.1, 70.0);

        let toa = toa_reflectance(&band, &p, &ToaParams::default()).unwrap();
        for r in 0..4 {
            for c in 0..4 {
                assert_eq!(toa.get(r, c).unwrap(), 1.0);
            }
        }
    }

    #[test]
    fn test_output_bounded() {
        // Mixed values never exceed 1.0 regardless of magnitude
        let mut band = dn_band(8, 8, 0);
        for i in 0..8 {
            for j in 0..8 {
                band.set(i, j, (i * 8000 + j * 100) as u16).unwrap();
            }
        }
        let p = cal(2.0e-5, -0.1, 45.0);
        let toa = toa_reflectance(&band, &p, &ToaParams::default()).unwrap();

        for i in 0..8 {
            for j in 0..8 {
                assert!(toa.get(i, j).unwrap() <= 1.0);
            }
        }
    }

    #[test]
    fn test_zenith_at_horizon_fails() {
        let band = dn_band(4, 4, 100);
        assert!(matches!(
            toa_reflectance(&band, &cal(2.0e-5, -0.1, 90.0), &ToaParams::default()),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(toa_reflectance(&band, &cal(2.0e-5, -0.1, 95.0), &ToaParams::default()).is_err());
    }

    #[test]
    fn test_tiling_introduces_no_seams() {
        let mut band = dn_band(70, 65, 0);
        for i in 0..70 {
            for j in 0..65 {
                band.set(i, j, (i * 65 + j) as u16).unwrap();
            }
        }
        let p = cal(2.0e-5, -0.1, 30.0);

        let tiled = toa_reflectance(&band, &p, &ToaParams { tile_size: 16 }).unwrap();
        let whole = toa_reflectance(&band, &p, &ToaParams { tile_size: 1024 }).unwrap();

        for i in 0..70 {
            for j in 0..65 {
                assert_eq!(tiled.get(i, j).unwrap(), whole.get(i, j).unwrap());
            }
        }
    }

    #[test]
    fn test_idempotence() {
        let mut band = dn_band(20, 20, 0);
        for i in 0..20 {
            for j in 0..20 {
                band.set(i, j, (i * 997 + j * 13) as u16).unwrap();
            }
        }
        let p = cal(2.0e-5, -0.1, 41.2);

        let a = toa_reflectance(&band, &p, &ToaParams::default()).unwrap();
        let b = toa_reflectance(&band, &p, &ToaParams::default()).unwrap();

        // Bit-identical output for identical inputs
        for i in 0..20 {
            for j in 0..20 {
                assert_eq!(
                    a.get(i, j).unwrap().to_bits(),
                    b.get(i, j).unwrap().to_bits()
                );
            }
        }
    }

    #[test]
    fn test_preserves_georeferencing() {
        let band = dn_band(10, 10, 500);
        let p = cal(2.0e-5, -0.1, 30.0);
        let toa = toa_reflectance(&band, &p, &ToaParams::default()).unwrap();
        assert_eq!(toa.transform(), band.transform());
    }
}
