//! Native GeoTIFF reading/writing (without GDAL)
//!
//! Delegates the TIFF codec to the `tiff` crate and only adds the GeoTIFF
//! georeferencing tags the pipeline needs. Warp, sieve and polygonize are
//! not available in native mode; enable the `gdal` feature for those.

use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement};
use std::fs::File;
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

// GeoTIFF tag ids (not part of the baseline TIFF tag set)
const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const GEO_KEY_DIRECTORY: u16 = 34735;

/// Options for writing GeoTIFF files
#[derive(Debug, Clone)]
pub struct GeoTiffOptions {
    /// Compression type (ignored in native mode)
    pub compression: String,
    /// Tile size for tiled TIFFs (ignored in native mode, which writes strips)
    pub tile_size: usize,
}

impl Default for GeoTiffOptions {
    fn default() -> Self {
        Self {
            compression: "NONE".to_string(),
            tile_size: 0,
        }
    }
}

/// Read a single-band GeoTIFF file into a Raster.
///
/// Samples are cast to `T`; the geotransform is recovered from the
/// pixel-scale and tiepoint tags when present.
pub fn read_geotiff<T, P>(path: P, band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::missing("raster file", path));
    }
    let file = File::open(path)?;
    decode_geotiff(file, band)
}

fn decode_geotiff<T, R>(reader: R, _band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
    R: std::io::Read + std::io::Seek,
{
    let mut decoder =
        Decoder::new(reader).map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;

    let rows = height as usize;
    let cols = width as usize;

    let result = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;

    macro_rules! cast_samples {
        ($buf:expr) => {
            $buf.iter()
                .map(|&v| num_traits::cast(v).unwrap_or(T::default_nodata()))
                .collect()
        };
    }

    let data: Vec<T> = match result {
        DecodingResult::U8(buf) => cast_samples!(buf),
        DecodingResult::U16(buf) => cast_samples!(buf),
        DecodingResult::U32(buf) => cast_samples!(buf),
        DecodingResult::I16(buf) => cast_samples!(buf),
        DecodingResult::I32(buf) => cast_samples!(buf),
        DecodingResult::F32(buf) => cast_samples!(buf),
        DecodingResult::F64(buf) => cast_samples!(buf),
        _ => {
            return Err(Error::UnsupportedDataType(
                "unsupported TIFF sample format".to_string(),
            ))
        }
    };

    if data.len() != rows * cols {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let mut raster = Raster::from_vec(data, rows, cols)?;
    if let Some(transform) = read_geotransform(&mut decoder) {
        raster.set_transform(transform);
    }

    Ok(raster)
}

/// Recover a GeoTransform from the ModelPixelScale + ModelTiepoint tags
fn read_geotransform<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
) -> Option<GeoTransform> {
    let scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag).ok()?;
    let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag).ok()?;

    if scale.len() < 2 || tiepoint.len() < 6 {
        return None;
    }

    // tiepoint: [I, J, K, X, Y, Z]; scale: [ScaleX, ScaleY, ScaleZ]
    let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
    let origin_y = tiepoint[4] + tiepoint[1] * scale[1];

    Some(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]))
}

/// Write a Raster to a GeoTIFF file.
///
/// Samples are written as 32-bit float regardless of `T`; quality masks
/// survive the round-trip because their codes are exactly representable.
pub fn write_geotiff<T, P>(
    raster: &Raster<T>,
    path: P,
    _options: Option<GeoTiffOptions>,
) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    let mut encoder =
        TiffEncoder::new(file).map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;

    let (rows, cols) = raster.shape();
    let data: Vec<f32> = raster
        .data()
        .iter()
        .map(|&v| num_traits::cast(v).unwrap_or(f32::NAN))
        .collect();

    let mut image = encoder
        .new_image::<Gray32Float>(cols as u32, rows as u32)
        .map_err(|e| Error::Other(format!("Cannot create TIFF image: {}", e)))?;

    let gt = raster.transform();

    let scale = vec![gt.pixel_width, gt.pixel_height.abs(), 0.0];
    image
        .encoder()
        .write_tag(Tag::Unknown(MODEL_PIXEL_SCALE), scale.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write scale tag: {}", e)))?;

    let tiepoint = vec![0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
    image
        .encoder()
        .write_tag(Tag::Unknown(MODEL_TIEPOINT), tiepoint.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write tiepoint tag: {}", e)))?;

    // Minimal GeoKey directory: GTModelTypeGeoKey = Projected,
    // GTRasterTypeGeoKey = RasterPixelIsArea
    let geokeys: Vec<u16> = vec![
        1, 1, 0, 2, //
        1024, 0, 1, 1, //
        1025, 0, 1, 1,
    ];
    image
        .encoder()
        .write_tag(Tag::Unknown(GEO_KEY_DIRECTORY), geokeys.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write geokey tag: {}", e)))?;

    image
        .write_data(&data)
        .map_err(|e| Error::Other(format!("Cannot write image data: {}", e)))?;

    Ok(())
}
