//! Scene metadata (MTL) parsing
//!
//! Landsat 8 ships a `*_MTL.txt` file of `KEY = VALUE` lines per scene. The
//! calibrator needs the per-band reflectance rescaling factors and the sun
//! elevation; everything else is ignored.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::Path;

/// Parameters for calibrating one band of one scene: the band-specific
/// rescaling factors plus the scene-wide solar zenith angle in degrees
/// (90° minus sun elevation).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationParameters {
    /// Band-specific multiplicative rescaling factor
    pub gain: f64,
    /// Band-specific additive rescaling factor
    pub offset: f64,
    /// Solar zenith angle in degrees
    pub solar_zenith: f64,
}

/// Numeric key/value entries of a scene's MTL metadata file.
///
/// Parsed once per scene, queried during calibration, then dropped.
#[derive(Debug, Clone)]
pub struct SceneMetadata {
    values: HashMap<String, f64>,
}

impl SceneMetadata {
    /// Read and parse an MTL file. A missing file is fatal for the
    /// calibration stage.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::missing("metadata file", path));
        }
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    /// Parse MTL text. Only `KEY = VALUE` lines with a numeric value are
    /// retained; group markers and quoted strings are skipped.
    pub fn parse(text: &str) -> Self {
        let mut values = HashMap::new();
        for line in text.lines() {
            if let Some((key, value)) = line.split_once('=') {
                if let Ok(v) = value.trim().parse::<f64>() {
                    values.insert(key.trim().to_string(), v);
                }
            }
        }
        Self { values }
    }

    fn value(&self, key: &str) -> Result<f64> {
        self.values
            .get(key)
            .copied()
            .ok_or_else(|| Error::Metadata(format!("missing or non-numeric key {}", key)))
    }

    /// Band-specific multiplicative reflectance rescaling factor
    pub fn reflectance_gain(&self, band: u8) -> Result<f64> {
        self.value(&format!("REFLECTANCE_MULT_BAND_{}", band))
    }

    /// Band-specific additive reflectance rescaling factor
    pub fn reflectance_offset(&self, band: u8) -> Result<f64> {
        self.value(&format!("REFLECTANCE_ADD_BAND_{}", band))
    }

    /// Sun elevation in degrees at acquisition time
    pub fn sun_elevation(&self) -> Result<f64> {
        self.value("SUN_ELEVATION")
    }

    /// Solar zenith angle in degrees (90° minus sun elevation)
    pub fn solar_zenith(&self) -> Result<f64> {
        Ok(90.0 - self.sun_elevation()?)
    }

    /// Full calibration parameters for one band
    pub fn calibration(&self, band: u8) -> Result<CalibrationParameters> {
        Ok(CalibrationParameters {
            gain: self.reflectance_gain(band)?,
            offset: self.reflectance_offset(band)?,
            solar_zenith: self.solar_zenith()?,
        })
    }
}
