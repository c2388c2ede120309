//! GDAL-backed raster I/O and geoprocessing provider
//!
//! Everything the pipeline delegates to the external geoprocessing library
//! lives here: GeoTIFF read/write, warp-to-extent, sieve and polygonize.
//! Sieve and polygonize are not exposed by the safe `gdal` wrapper, so they
//! go through `gdal-sys` directly; the raw handles never leave this module.

use crate::crs::Crs;
use crate::error::{Error, Result};
use crate::io::GeoProvider;
use crate::raster::{BoundingBox, GeoTransform, Raster, RasterElement};
use gdal::raster::{Buffer, GdalType, RasterCreationOptions};
use gdal::spatial_ref::{AxisMappingStrategy, CoordTransform, SpatialRef};
use gdal::vector::{FieldDefn, FieldValue, LayerAccess, LayerOptions};
use gdal::{Dataset, DriverManager};
use std::path::Path;

/// Options for writing GeoTIFF files
#[derive(Debug, Clone)]
pub struct GeoTiffOptions {
    /// Compression type: "DEFLATE", "LZW", "ZSTD", "NONE"
    pub compression: String,
    /// Tile size for tiled TIFFs (0 for strips)
    pub tile_size: usize,
}

impl Default for GeoTiffOptions {
    fn default() -> Self {
        Self {
            compression: "DEFLATE".to_string(),
            tile_size: 256,
        }
    }
}

/// Read a GeoTIFF file into a Raster
pub fn read_geotiff<T, P>(path: P, band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement + GdalType,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::missing("raster file", path));
    }

    let dataset = Dataset::open(path)?;
    let band_idx = band.unwrap_or(1);
    let rasterband = dataset.rasterband(band_idx)?;

    let (cols, rows) = dataset.raster_size();
    let buffer = rasterband.read_as::<T>((0, 0), (cols, rows), (cols, rows), None)?;

    let mut raster = Raster::from_vec(buffer.data().to_vec(), rows, cols)?;

    if let Ok(gt) = dataset.geo_transform() {
        raster.set_transform(GeoTransform::from_gdal(gt));
    }

    if let Ok(srs) = dataset.spatial_ref() {
        raster.set_crs(Some(crs_from_spatial_ref(&srs)));
    }

    if let Ok(nodata) = rasterband.no_data_value() {
        if let Some(nd) = num_traits::cast(nodata) {
            raster.set_nodata(Some(nd));
        }
    }

    Ok(raster)
}

/// Write a Raster to a GeoTIFF file
pub fn write_geotiff<T, P>(
    raster: &Raster<T>,
    path: P,
    options: Option<GeoTiffOptions>,
) -> Result<()>
where
    T: RasterElement + GdalType,
    P: AsRef<Path>,
{
    let opts = options.unwrap_or_default();
    let driver = DriverManager::get_driver_by_name("GTiff")?;

    let (rows, cols) = raster.shape();

    let mut create_options = vec![format!("COMPRESS={}", opts.compression)];
    if opts.tile_size > 0 {
        create_options.push("TILED=YES".to_string());
        create_options.push(format!("BLOCKXSIZE={}", opts.tile_size));
        create_options.push(format!("BLOCKYSIZE={}", opts.tile_size));
    }
    let create_options = RasterCreationOptions::from_iter(create_options);

    let mut dataset = driver.create_with_band_type_with_options::<T, _>(
        path.as_ref(),
        cols,
        rows,
        1,
        &create_options,
    )?;

    dataset.set_geo_transform(&raster.transform().to_gdal())?;

    if let Some(crs) = raster.crs() {
        if let Some(srs) = spatial_ref_from_crs(crs)? {
            dataset.set_spatial_ref(&srs)?;
        }
    }

    let mut band = dataset.rasterband(1)?;
    if let Some(nodata) = raster.nodata() {
        if let Some(nd) = num_traits::cast(nodata) {
            band.set_no_data_value(Some(nd))?;
        }
    }

    let data: Vec<T> = raster.data().iter().copied().collect();
    let mut buffer = Buffer::new((cols, rows), data);
    band.write((0, 0), (cols, rows), &mut buffer)?;

    Ok(())
}

fn crs_from_spatial_ref(srs: &SpatialRef) -> Crs {
    if let Ok(code) = srs.auth_code() {
        return Crs::from_epsg(code as u32);
    }
    match srs.to_wkt() {
        Ok(wkt) => Crs::from_wkt(wkt),
        Err(_) => Crs::from_wkt(String::new()),
    }
}

fn spatial_ref_from_crs(crs: &Crs) -> Result<Option<SpatialRef>> {
    if let Some(epsg) = crs.epsg() {
        return Ok(Some(SpatialRef::from_epsg(epsg)?));
    }
    if let Some(wkt) = crs.wkt() {
        if !wkt.is_empty() {
            return Ok(Some(SpatialRef::from_wkt(wkt)?));
        }
    }
    Ok(None)
}

/// The GDAL implementation of the geoprocessing provider interface
#[derive(Debug, Default, Clone, Copy)]
pub struct GdalProvider;

impl GeoProvider for GdalProvider {
    /// Resample a raster onto the given extent, keeping its pixel size.
    fn warp_to_bounds(&self, src: &Path, bounds: &BoundingBox, dst: &Path) -> Result<()> {
        let src_ds = Dataset::open(src)?;
        let gt = GeoTransform::from_gdal(src_ds.geo_transform()?);

        let px = gt.pixel_width.abs();
        let py = gt.pixel_height.abs();
        if px <= 0.0 || py <= 0.0 {
            return Err(Error::Provider(format!(
                "degenerate pixel size in {}",
                src.display()
            )));
        }

        let cols = (bounds.width() / px).round() as usize;
        let rows = (bounds.height() / py).round() as usize;
        if cols == 0 || rows == 0 {
            return Err(Error::Provider(
                "requested warp extent is smaller than one pixel".to_string(),
            ));
        }

        let driver = DriverManager::get_driver_by_name("GTiff")?;
        let mut dst_ds = driver.create_with_band_type_with_options::<f32, _>(
            dst,
            cols,
            rows,
            1,
            &RasterCreationOptions::default(),
        )?;

        let target = GeoTransform::new(bounds.min_x, bounds.max_y, px, -py);
        dst_ds.set_geo_transform(&target.to_gdal())?;
        if let Ok(srs) = src_ds.spatial_ref() {
            dst_ds.set_spatial_ref(&srs)?;
        }

        gdal::raster::reproject(&src_ds, &dst_ds)?;
        Ok(())
    }

    /// Zero out connected components smaller than `min_pixels`.
    fn sieve(&self, src: &Path, dst: &Path, min_pixels: usize) -> Result<()> {
        let src_ds = Dataset::open(src)?;
        let (cols, rows) = src_ds.raster_size();

        let driver = DriverManager::get_driver_by_name("GTiff")?;
        let mut dst_ds = driver.create_with_band_type_with_options::<u8, _>(
            dst,
            cols,
            rows,
            1,
            &RasterCreationOptions::default(),
        )?;
        dst_ds.set_geo_transform(&src_ds.geo_transform()?)?;
        if let Ok(srs) = src_ds.spatial_ref() {
            dst_ds.set_spatial_ref(&srs)?;
        }

        unsafe {
            let src_band = gdal_sys::GDALGetRasterBand(src_ds.c_dataset(), 1);
            let dst_band = gdal_sys::GDALGetRasterBand(dst_ds.c_dataset(), 1);
            let rv = gdal_sys::GDALSieveFilter(
                src_band,
                std::ptr::null_mut(),
                dst_band,
                min_pixels as i32,
                4, // four-connected neighborhood
                std::ptr::null_mut(),
                None,
                std::ptr::null_mut(),
            );
            if rv != gdal_sys::CPLErr::CE_None {
                return Err(Error::Provider(format!(
                    "GDALSieveFilter failed on {}",
                    src.display()
                )));
            }
        }

        dst_ds.flush_cache()?;
        Ok(())
    }

    /// Convert a mask raster to polygons, keep only `keep_class`, reproject
    /// to `target` and write GeoJSON.
    fn polygonize(&self, src: &Path, dst: &Path, keep_class: i32, target: &Crs) -> Result<()> {
        let src_ds = Dataset::open(src)?;
        let src_srs = src_ds.spatial_ref()?;

        let target_srs = match spatial_ref_from_crs(target)? {
            Some(srs) => srs,
            None => {
                return Err(Error::Provider(
                    "polygonize target CRS carries no identifier".to_string(),
                ))
            }
        };
        target_srs.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);

        // Polygonize into a scratch in-memory layer in the source CRS
        let mem_driver = DriverManager::get_driver_by_name("Memory")?;
        let mut mem_ds = mem_driver.create_vector_only("")?;
        let mut mem_layer = mem_ds.create_layer(LayerOptions {
            name: "raw",
            srs: Some(&src_srs),
            ty: gdal_sys::OGRwkbGeometryType::wkbPolygon,
            options: None,
        })?;
        let field = FieldDefn::new("DN", gdal_sys::OGRFieldType::OFTInteger)?;
        field.add_to_layer(&mem_layer)?;

        unsafe {
            let band = gdal_sys::GDALGetRasterBand(src_ds.c_dataset(), 1);
            let rv = gdal_sys::GDALPolygonize(
                band,
                std::ptr::null_mut(),
                mem_layer.c_layer(),
                0, // index of the DN field
                std::ptr::null_mut(),
                None,
                std::ptr::null_mut(),
            );
            if rv != gdal_sys::CPLErr::CE_None {
                return Err(Error::Provider(format!(
                    "GDALPolygonize failed on {}",
                    src.display()
                )));
            }
        }

        // Filter to the changed class and reproject into the output file
        let out_driver = DriverManager::get_driver_by_name("GeoJSON")?;
        let mut out_ds = out_driver.create_vector_only(dst)?;
        let mut out_layer = out_ds.create_layer(LayerOptions {
            name: "detection",
            srs: Some(&target_srs),
            ty: gdal_sys::OGRwkbGeometryType::wkbPolygon,
            options: None,
        })?;
        let out_field = FieldDefn::new("DN", gdal_sys::OGRFieldType::OFTInteger)?;
        out_field.add_to_layer(&out_layer)?;

        let transform = CoordTransform::new(&src_srs, &target_srs)?;
        for feature in mem_layer.features() {
            let class = feature.field_as_integer_by_name("DN")?.unwrap_or(0);
            if class != keep_class {
                continue;
            }
            let geometry = match feature.geometry() {
                Some(g) => g,
                None => continue,
            };
            let mut reprojected = geometry.clone();
            reprojected.transform_inplace(&transform)?;
            out_layer.create_feature_fields(
                reprojected,
                &["DN"],
                &[FieldValue::IntegerValue(class)],
            )?;
        }

        Ok(())
    }
}
