use crate::core::band::RasterBand;
use crate::core::boundary::Boundary;
use crate::io::output::write_shoreline_csv;
use crate::types::{Crs, ShorelineError, ShorelinePoint, ShorelineResult};
use gdal::spatial_ref::CoordTransform;
use std::path::Path;

/// How world coordinates reach the target CRS
enum Transform {
    /// Source and target describe the same system
    Identity,
    Gdal(CoordTransform),
}

impl Transform {
    fn new(source: &Crs, target: &Crs) -> ShorelineResult<Self> {
        if source.is_equivalent(target) {
            return Ok(Transform::Identity);
        }
        let src = source.to_spatial_ref()?;
        let dst = target.to_spatial_ref()?;
        Ok(Transform::Gdal(CoordTransform::new(&src, &dst)?))
    }

    fn apply(&self, xs: &mut [f64], ys: &mut [f64]) -> ShorelineResult<()> {
        match self {
            Transform::Identity => Ok(()),
            Transform::Gdal(transform) => {
                let mut zs = vec![0.0; xs.len()];
                transform.transform_coords(xs, ys, &mut zs)?;
                Ok(())
            }
        }
    }
}

impl RasterBand {
    /// Geographic position of pixels given as (row, col)
    ///
    /// World coordinates come from the band's geotransform, shifted by half a
    /// pixel when `center` is set, then transformed from the band projection
    /// into `target`. Use `position_to_csv` to also persist them.
    pub fn position(
        &self,
        pixels: &[(usize, usize)],
        target: &Crs,
        center: bool,
    ) -> ShorelineResult<Vec<ShorelinePoint>> {
        if pixels.is_empty() {
            return Ok(Vec::new());
        }
        let (rows, cols) = self.shape();
        if let Some(&(row, col)) = pixels.iter().find(|&&(r, c)| r >= rows || c >= cols) {
            return Err(ShorelineError::InvalidParameter(format!(
                "pixel ({}, {}) outside a {}x{} band",
                row, col, rows, cols
            )));
        }

        let gt = &self.geotransform;
        let (dx, dy) = if center {
            (gt.pixel_width / 2.0, gt.pixel_height / 2.0)
        } else {
            (0.0, 0.0)
        };

        let mut xs = Vec::with_capacity(pixels.len());
        let mut ys = Vec::with_capacity(pixels.len());
        for &(row, col) in pixels {
            let (x, y) = gt.pixel_to_world(row as f64, col as f64);
            xs.push(x + dx);
            ys.push(y + dy);
        }

        Transform::new(&self.projection, target)?.apply(&mut xs, &mut ys)?;

        Ok(xs
            .into_iter()
            .zip(ys)
            .map(|(lon, lat)| ShorelinePoint { lon, lat })
            .collect())
    }

    /// `position`, then write the points as header-less `lon,lat` rows to `saveto`
    pub fn position_to_csv<P: AsRef<Path>>(
        &self,
        pixels: &[(usize, usize)],
        target: &Crs,
        center: bool,
        saveto: P,
    ) -> ShorelineResult<Vec<ShorelinePoint>> {
        let points = self.position(pixels, target, center)?;
        write_shoreline_csv(saveto, &points, None)?;
        Ok(points)
    }
}

/// Maps shoreline pixels to coordinates in a target CRS
#[derive(Debug, Clone)]
pub struct GeoReferencer {
    target: Crs,
    center: bool,
}

impl GeoReferencer {
    /// Referencer into EPSG `target_epsg`, at pixel centres when `center` is set
    pub fn new(target_epsg: u32, center: bool) -> Self {
        Self {
            target: Crs::Epsg(target_epsg),
            center,
        }
    }

    /// Output coordinate system
    pub fn target(&self) -> &Crs {
        &self.target
    }

    /// Coordinates of every boundary pixel, in row-major order
    pub fn points(&self, boundary: &Boundary) -> ShorelineResult<Vec<ShorelinePoint>> {
        let points = boundary
            .band
            .position(&boundary.pixels, &self.target, self.center)?;
        log::info!(
            "Georeferenced {} shoreline points from {} to {}",
            points.len(),
            boundary.band.projection,
            self.target
        );
        Ok(points)
    }
}

impl Default for GeoReferencer {
    fn default() -> Self {
        Self::new(4326, true)
    }
}
