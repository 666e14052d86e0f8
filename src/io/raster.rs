use crate::core::band::RasterBand;
use crate::types::{BoundingBox, Crs, GeoTransform, Sample, ShorelineError, ShorelineResult};
use gdal::raster::{Buffer, GdalType};
use gdal::spatial_ref::{CoordTransform, SpatialRef};
use gdal::{Dataset, DriverManager};
use ndarray::Array2;
use num_traits::NumCast;
use std::path::Path;

/// Sample type of a written GeoTIFF
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterDataType {
    /// 32-bit float, NaN as no-data
    Float32,
    /// 8-bit unsigned, for binary maps; 255 as no-data
    UInt8,
}

impl RasterDataType {
    /// No-data value written for NaN samples
    pub fn nodata(&self) -> f64 {
        match self {
            RasterDataType::Float32 => f64::NAN,
            RasterDataType::UInt8 => 255.0,
        }
    }
}

/// Read a single-band raster with its geotransform and projection
///
/// Pixels equal to the file's no-data value are returned as NaN.
pub fn read_band<P: AsRef<Path>>(path: P) -> ShorelineResult<RasterBand> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ShorelineError::MissingInput(path.to_path_buf()));
    }
    log::debug!("Reading raster: {}", path.display());

    let dataset = Dataset::open(path)?;
    let count = dataset.raster_count();
    if count != 1 {
        return Err(ShorelineError::InvalidFormat(format!(
            "{} has {} bands, expected exactly one",
            path.display(),
            count
        )));
    }

    let (width, height) = dataset.raster_size();
    let geotransform = GeoTransform::from_gdal(dataset.geo_transform()?);
    let projection = Crs::from_projection(&dataset.projection());

    let rasterband = dataset.rasterband(1)?;
    let nodata = rasterband.no_data_value();
    let buffer = rasterband.read_as::<Sample>((0, 0), (width, height), (width, height), None)?;

    let mut data = Array2::from_shape_vec((height, width), buffer.data).map_err(|e| {
        ShorelineError::InvalidFormat(format!("{}: {}", path.display(), e))
    })?;
    if let Some(nd) = nodata.filter(|v| !v.is_nan()) {
        let nd = nd as Sample;
        data.mapv_inplace(|v| if v == nd { Sample::NAN } else { v });
    }

    log::debug!(
        "Raster {}x{} ({}), pixel {}x{}",
        width,
        height,
        projection,
        geotransform.pixel_width,
        geotransform.pixel_height
    );
    Ok(RasterBand::new(data, geotransform, projection))
}

/// Persist a band as a single-band GeoTIFF
///
/// With `epsg` set to a system other than the band's own, the grid is warped
/// into that system first.
pub fn write_geotiff<P: AsRef<Path>>(
    band: &RasterBand,
    path: P,
    dtype: RasterDataType,
    epsg: Option<u32>,
) -> ShorelineResult<()> {
    let path = path.as_ref();
    log::info!("Saving GeoTIFF: {}", path.display());

    let target = epsg.map(Crs::Epsg);
    match target {
        Some(target) if !band.projection.is_equivalent(&target) => {
            write_reprojected(band, path, dtype, &target)
        }
        _ => {
            let srs = match band.projection {
                Crs::Unknown => None,
                ref crs => Some(crs.to_spatial_ref()?),
            };
            create_dataset("GTiff", path, band, dtype, srs.as_ref())?;
            Ok(())
        }
    }
}

fn write_reprojected(
    band: &RasterBand,
    path: &Path,
    dtype: RasterDataType,
    target: &Crs,
) -> ShorelineResult<()> {
    let src_srs = band.projection.to_spatial_ref()?;
    let dst_srs = target.to_spatial_ref()?;
    let source = create_dataset("MEM", Path::new(""), band, dtype, Some(&src_srs))?;

    let (rows, cols) = band.shape();
    let bbox = transform_bounds(
        &band.geotransform.bounds(rows, cols),
        &CoordTransform::new(&src_srs, &dst_srs)?,
    )?;

    // Square pixels, same pixel count as the source grid
    let pixel = (bbox.width() * bbox.height() / (rows * cols) as f64).sqrt();
    if !pixel.is_finite() || pixel <= 0.0 {
        return Err(ShorelineError::Processing(format!(
            "degenerate footprint {:?} after reprojection to {}",
            bbox, target
        )));
    }
    let out_cols = ((bbox.width() / pixel).ceil() as usize).max(1);
    let out_rows = ((bbox.height() / pixel).ceil() as usize).max(1);
    let out_gt = GeoTransform::new(bbox.min_x, bbox.max_y, pixel, -pixel);
    log::debug!(
        "Reprojecting {}x{} grid to {} as {}x{} at {:.6}",
        cols,
        rows,
        target,
        out_cols,
        out_rows,
        pixel
    );

    let blank = RasterBand::new(
        Array2::from_elem((out_rows, out_cols), Sample::NAN),
        out_gt,
        target.clone(),
    );
    let destination = create_dataset("GTiff", path, &blank, dtype, Some(&dst_srs))?;
    gdal::raster::reproject(&source, &destination)?;
    Ok(())
}

fn transform_bounds(
    bbox: &BoundingBox,
    transform: &CoordTransform,
) -> ShorelineResult<BoundingBox> {
    let mut xs = [bbox.min_x, bbox.max_x, bbox.min_x, bbox.max_x];
    let mut ys = [bbox.min_y, bbox.min_y, bbox.max_y, bbox.max_y];
    let mut zs = [0.0; 4];
    transform.transform_coords(&mut xs, &mut ys, &mut zs)?;
    let corners: Vec<(f64, f64)> = xs.iter().copied().zip(ys.iter().copied()).collect();
    Ok(BoundingBox::enclosing(&corners))
}

fn create_dataset(
    driver: &str,
    path: &Path,
    band: &RasterBand,
    dtype: RasterDataType,
    srs: Option<&SpatialRef>,
) -> ShorelineResult<Dataset> {
    match dtype {
        RasterDataType::Float32 => {
            let samples = band.data.iter().copied().collect();
            create_typed::<f32>(driver, path, band, samples, dtype.nodata(), srs)
        }
        RasterDataType::UInt8 => {
            let nodata = dtype.nodata() as u8;
            let samples = band
                .data
                .iter()
                .map(|&v| <u8 as NumCast>::from(v.round()).unwrap_or(nodata))
                .collect();
            create_typed::<u8>(driver, path, band, samples, dtype.nodata(), srs)
        }
    }
}

fn create_typed<T: GdalType + Copy>(
    driver: &str,
    path: &Path,
    band: &RasterBand,
    samples: Vec<T>,
    nodata: f64,
    srs: Option<&SpatialRef>,
) -> ShorelineResult<Dataset> {
    let (height, width) = band.shape();
    let driver = DriverManager::get_driver_by_name(driver)?;
    let mut dataset =
        driver.create_with_band_type::<T, _>(path, width as isize, height as isize, 1)?;

    dataset.set_geo_transform(&band.geotransform.to_gdal())?;
    if let Some(srs) = srs {
        dataset.set_spatial_ref(srs)?;
    }

    let mut rasterband = dataset.rasterband(1)?;
    rasterband.set_no_data_value(Some(nodata))?;
    let buffer = Buffer::new((width, height), samples);
    rasterband.write((0, 0), (width, height), &buffer)?;
    drop(rasterband);

    Ok(dataset)
}

impl RasterBand {
    /// Read a single-band raster, see [`read_band`]
    pub fn open<P: AsRef<Path>>(path: P) -> ShorelineResult<RasterBand> {
        read_band(path)
    }

    /// Write as GeoTIFF, see [`write_geotiff`]
    pub fn to_geotiff<P: AsRef<Path>>(
        &self,
        path: P,
        dtype: RasterDataType,
        epsg: Option<u32>,
    ) -> ShorelineResult<()> {
        write_geotiff(self, path, dtype, epsg)
    }
}
