//! Coordinate Reference System tags
//!
//! vegscan does not reproject rasters itself; a CRS is carried as an opaque
//! tag so it can be handed back to the geoprocessing provider unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate Reference System representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crs {
    /// WKT representation, if read from a raster
    wkt: Option<String>,
    /// EPSG code, if known
    epsg: Option<u32>,
}

impl Crs {
    /// Create a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self {
            wkt: None,
            epsg: Some(code),
        }
    }

    /// Create a CRS from a WKT string
    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        Self {
            wkt: Some(wkt.into()),
            epsg: None,
        }
    }

    /// SIRGAS 2000 geographic CRS, the default target for vectorized
    /// change artifacts
    pub fn sirgas2000() -> Self {
        Self::from_epsg(4674)
    }

    /// Get the EPSG code if known
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Get the WKT representation
    pub fn wkt(&self) -> Option<&str> {
        self.wkt.as_deref()
    }

    /// Check whether two CRS tags refer to the same system, as far as the
    /// carried identifiers allow
    pub fn is_equivalent(&self, other: &Crs) -> bool {
        if let (Some(a), Some(b)) = (self.epsg, other.epsg) {
            return a == b;
        }
        if let (Some(a), Some(b)) = (&self.wkt, &other.wkt) {
            return a == b;
        }
        false
    }

    /// Short identifier for logs and `info` output
    pub fn identifier(&self) -> String {
        if let Some(code) = self.epsg {
            return format!("EPSG:{}", code);
        }
        if let Some(wkt) = &self.wkt {
            return format!("WKT:{}", &wkt[..wkt.len().min(50)]);
        }
        "Unknown".to_string()
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crs_epsg() {
        let crs = Crs::from_epsg(4674);
        assert_eq!(crs.epsg(), Some(4674));
        assert_eq!(crs.identifier(), "EPSG:4674");
    }

    #[test]
    fn test_crs_equivalence() {
        let a = Crs::from_epsg(4674);
        let b = Crs::sirgas2000();
        assert!(a.is_equivalent(&b));
        assert!(!a.is_equivalent(&Crs::from_epsg(4326)));
    }
}
