//! Affine geotransformation and geographic bounding boxes

use serde::{Deserialize, Serialize};

/// Affine transformation coefficients for georeferencing rasters.
///
/// Converts pixel coordinates (col, row) to geographic coordinates (x, y):
/// ```text
/// x = origin_x + col * pixel_width + row * row_rotation
/// y = origin_y + col * col_rotation + row * pixel_height
/// ```
///
/// For north-up images, `row_rotation` and `col_rotation` are 0 and
/// `pixel_height` is negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// X coordinate of the upper-left corner
    pub origin_x: f64,
    /// Y coordinate of the upper-left corner
    pub origin_y: f64,
    /// Pixel width (cell size in X direction)
    pub pixel_width: f64,
    /// Pixel height (cell size in Y direction, usually negative)
    pub pixel_height: f64,
    /// Rotation about X axis (usually 0)
    pub row_rotation: f64,
    /// Rotation about Y axis (usually 0)
    pub col_rotation: f64,
}

impl GeoTransform {
    /// Create a new GeoTransform with no rotation (north-up image)
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
            row_rotation: 0.0,
            col_rotation: 0.0,
        }
    }

    /// Create from a GDAL-style array
    /// `[origin_x, pixel_width, row_rotation, origin_y, col_rotation, pixel_height]`
    pub fn from_gdal(coeffs: [f64; 6]) -> Self {
        Self {
            origin_x: coeffs[0],
            pixel_width: coeffs[1],
            row_rotation: coeffs[2],
            origin_y: coeffs[3],
            col_rotation: coeffs[4],
            pixel_height: coeffs[5],
        }
    }

    /// Convert to a GDAL-style array
    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.origin_x,
            self.pixel_width,
            self.row_rotation,
            self.origin_y,
            self.col_rotation,
            self.pixel_height,
        ]
    }

    /// Geographic coordinates of the top-left corner of pixel (col, row)
    pub fn pixel_to_geo_corner(&self, col: usize, row: usize) -> (f64, f64) {
        let col_f = col as f64;
        let row_f = row as f64;

        let x = self.origin_x + col_f * self.pixel_width + row_f * self.row_rotation;
        let y = self.origin_y + col_f * self.col_rotation + row_f * self.pixel_height;

        (x, y)
    }

    /// Get the cell size (assumes square pixels and no rotation)
    pub fn cell_size(&self) -> f64 {
        self.pixel_width.abs()
    }

    /// Bounding box of a raster of the given dimensions under this transform.
    ///
    /// Built from all four corner coordinates, so it also holds for rotated
    /// transforms.
    pub fn bounding_box(&self, cols: usize, rows: usize) -> BoundingBox {
        let (x0, y0) = self.pixel_to_geo_corner(0, 0);
        let (x1, y1) = self.pixel_to_geo_corner(cols, 0);
        let (x2, y2) = self.pixel_to_geo_corner(0, rows);
        let (x3, y3) = self.pixel_to_geo_corner(cols, rows);

        BoundingBox {
            min_x: x0.min(x1).min(x2).min(x3),
            min_y: y0.min(y1).min(y2).min(y3),
            max_x: x0.max(x1).max(x2).max(x3),
            max_y: y0.max(y1).max(y2).max(y3),
        }
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}

/// Axis-aligned geographic bounding box: lower-left (min_x, min_y) and
/// upper-right (max_x, max_y) corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Intersection of two boxes: the max of the lower-left corners and the
    /// min of the upper-right corners. Returns `None` when the boxes do not
    /// overlap.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        let min_x = self.min_x.max(other.min_x);
        let min_y = self.min_y.max(other.min_y);
        let max_x = self.max_x.min(other.max_x);
        let max_y = self.max_y.min(other.max_y);

        if min_x < max_x && min_y < max_y {
            Some(BoundingBox {
                min_x,
                min_y,
                max_x,
                max_y,
            })
        } else {
            None
        }
    }

    /// Approximate equality, used to decide whether two rasters already
    /// share an extent and resampling can be skipped
    pub fn approx_eq(&self, other: &BoundingBox, epsilon: f64) -> bool {
        (self.min_x - other.min_x).abs() < epsilon
            && (self.min_y - other.min_y).abs() < epsilon
            && (self.max_x - other.max_x).abs() < epsilon
            && (self.max_y - other.max_y).abs() < epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bounding_box() {
        let gt = GeoTransform::new(0.0, 100.0, 1.0, -1.0);
        let bbox = gt.bounding_box(100, 100);

        assert_relative_eq!(bbox.min_x, 0.0, epsilon = 1e-10);
        assert_relative_eq!(bbox.min_y, 0.0, epsilon = 1e-10);
        assert_relative_eq!(bbox.max_x, 100.0, epsilon = 1e-10);
        assert_relative_eq!(bbox.max_y, 100.0, epsilon = 1e-10);
    }

    #[test]
    fn test_intersection_identical() {
        // Two identical extents intersect to themselves unchanged
        let a = BoundingBox::new(10.0, 20.0, 110.0, 120.0);
        let b = a;
        assert_eq!(a.intersection(&b), Some(a));
    }

    #[test]
    fn test_intersection_partial() {
        let a = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let b = BoundingBox::new(50.0, -20.0, 150.0, 80.0);

        let i = a.intersection(&b).unwrap();
        assert_relative_eq!(i.min_x, 50.0);
        assert_relative_eq!(i.min_y, 0.0);
        assert_relative_eq!(i.max_x, 100.0);
        assert_relative_eq!(i.max_y, 80.0);
    }

    #[test]
    fn test_intersection_disjoint() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(20.0, 20.0, 30.0, 30.0);
        assert_eq!(a.intersection(&b), None);
    }

    #[test]
    fn test_gdal_roundtrip() {
        let gt = GeoTransform::new(414000.0, 9256500.0, 30.0, -30.0);
        let back = GeoTransform::from_gdal(gt.to_gdal());
        assert_eq!(gt, back);
    }
}
