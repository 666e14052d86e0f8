//! Single parameterized shoreline pipeline
//!
//! synthesis -> hue/value -> adaptive threshold -> blob filter -> boundary -> georeference

use crate::core::blob_filter::{BlobFilter, BlobFilterParams};
use crate::core::boundary::{Boundary, BoundaryExtractor};
use crate::core::georeference::GeoReferencer;
use crate::core::hue_value::{HsvMethod, HueValue, HueValueExtractor};
use crate::core::synthesis::{ChannelSynthesizer, SynthesisInputs, SynthesisParams, SynthesizedRgb};
use crate::core::threshold::{AdaptiveThresholder, ThresholdOutcome, ThresholdParams};
use crate::core::Classification;
use crate::io::output::{write_shoreline_csv, OutputLayout};
use crate::io::raster::{write_geotiff, RasterDataType};
use crate::io::tile::{BandCodes, TileProduct};
use crate::types::{ShorelineError, ShorelinePoint, ShorelineResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// Run configuration for one acquisition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShorelineParams {
    pub synthesis: SynthesisParams,
    pub threshold: ThresholdParams,
    pub blob: BlobFilterParams,
    /// EPSG code of the output coordinates
    pub target_epsg: u32,
    /// Report pixel centres instead of top-left corners
    pub pixel_center: bool,
    pub hsv_method: HsvMethod,
    /// Also write the cleaned water map and boundary map as GeoTIFF
    pub write_rasters: bool,
    /// Reproject written rasters to this EPSG code
    pub raster_epsg: Option<u32>,
    /// Prefix CSV rows with timestamp, satellite and zone
    pub csv_metadata: bool,
    pub band_codes: BandCodes,
    /// Threshold parameters for specific zones, e.g. `"30TXR"`
    pub tile_overrides: HashMap<String, ThresholdParams>,
}

impl Default for ShorelineParams {
    fn default() -> Self {
        Self {
            synthesis: SynthesisParams::default(),
            threshold: ThresholdParams::default(),
            blob: BlobFilterParams::default(),
            target_epsg: 4326,
            pixel_center: true,
            hsv_method: HsvMethod::default(),
            write_rasters: false,
            raster_epsg: None,
            csv_metadata: true,
            band_codes: BandCodes::default(),
            tile_overrides: HashMap::new(),
        }
    }
}

impl ShorelineParams {
    /// Load from a JSON document; absent fields keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ShorelineResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let params: Self = serde_json::from_str(&text)?;
        log::debug!("Loaded parameters from {}: {:?}", path.as_ref().display(), params);
        Ok(params)
    }

    /// Threshold parameters for `zone`, falling back to the global ones
    pub fn threshold_for(&self, zone: Option<&str>) -> &ThresholdParams {
        zone.and_then(|z| self.tile_overrides.get(z))
            .unwrap_or(&self.threshold)
    }
}

/// Every intermediate and final result of one run
#[derive(Debug, Clone)]
pub struct ShorelineProduct {
    pub rgb: SynthesizedRgb,
    pub hue_value: HueValue,
    pub threshold: ThresholdOutcome,
    /// Blob-filtered water map
    pub water: Classification,
    pub boundary: Boundary,
    pub points: Vec<ShorelinePoint>,
}

/// Shoreline extraction for one acquisition
pub struct ShorelinePipeline {
    params: ShorelineParams,
}

impl ShorelinePipeline {
    /// Create a pipeline with the given run configuration
    pub fn new(params: ShorelineParams) -> Self {
        Self { params }
    }

    /// Get the run configuration
    pub fn params(&self) -> &ShorelineParams {
        &self.params
    }

    /// Run every stage on in-memory bands
    ///
    /// `zone` selects per-tile threshold overrides.
    pub fn run_bands(
        &self,
        inputs: SynthesisInputs<'_>,
        zone: Option<&str>,
    ) -> ShorelineResult<ShorelineProduct> {
        let p = &self.params;

        log::info!("Step 1: Channel synthesis");
        let rgb = ChannelSynthesizer::new(p.synthesis.clone()).synthesize(inputs)?;

        log::info!("Step 2: Hue/Value extraction");
        let hue_value =
            HueValueExtractor::new(p.hsv_method).extract(&rgb.red, &rgb.green, &rgb.blue)?;

        log::info!("Step 3: Adaptive thresholding");
        let threshold_params = p.threshold_for(zone).clone();
        log::debug!("Threshold parameters: {:?}", threshold_params);
        let threshold = AdaptiveThresholder::new(threshold_params).threshold(
            &rgb.alpha,
            &hue_value.hue,
            &hue_value.value,
        )?;

        log::info!("Step 4: Blob filtering");
        let water = BlobFilter::new(p.blob.clone()).apply(threshold.water.clone())?;

        log::info!("Step 5: Boundary extraction");
        let boundary = BoundaryExtractor::new().extract(&water)?;

        log::info!("Step 6: Georeferencing");
        let points = GeoReferencer::new(p.target_epsg, p.pixel_center).points(&boundary)?;

        if points.is_empty() {
            log::warn!("No shoreline found");
        }

        Ok(ShorelineProduct {
            rgb,
            hue_value,
            threshold,
            water,
            boundary,
            points,
        })
    }

    /// Load an acquisition from disk, run it and write its outputs under `output_root`
    pub fn run_tile<P: AsRef<Path>>(
        &self,
        tile: &TileProduct,
        output_root: P,
    ) -> ShorelineResult<ShorelineProduct> {
        self.run_tile_cancellable(tile, output_root, &AtomicBool::new(false))
    }

    /// Like `run_tile`, but writes nothing once `cancelled` is set
    pub fn run_tile_cancellable<P: AsRef<Path>>(
        &self,
        tile: &TileProduct,
        output_root: P,
        cancelled: &AtomicBool,
    ) -> ShorelineResult<ShorelineProduct> {
        let p = &self.params;
        let info = tile.info();
        log::info!("Processing acquisition {}", info.prefix);

        let bands = tile.load(p.synthesis.use_edge_mask)?;
        let product = self.run_bands(bands.inputs(), info.zone.as_deref())?;
        drop(bands);

        if cancelled.load(Ordering::SeqCst) {
            log::warn!("Acquisition {} abandoned, skipping outputs", info.prefix);
            return Err(ShorelineError::Cancelled(info.prefix));
        }

        let layout = OutputLayout::for_acquisition(output_root, &info);
        layout.ensure()?;

        let meta = if p.csv_metadata { Some(&info) } else { None };
        write_shoreline_csv(layout.shoreline_csv(), &product.points, meta)?;

        if p.write_rasters {
            write_geotiff(
                &product.water.band,
                layout.water_tif(),
                RasterDataType::Float32,
                p.raster_epsg,
            )?;
            write_geotiff(
                &product.boundary.band,
                layout.boundary_tif(),
                RasterDataType::Float32,
                p.raster_epsg,
            )?;
        }

        log::info!(
            "Acquisition {} done: {} shoreline points in {}",
            info.prefix,
            product.points.len(),
            layout.dir().display()
        );
        Ok(product)
    }
}
