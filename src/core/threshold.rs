use crate::core::band::{BandStatistics, RasterBand};
use crate::core::Classification;
use crate::types::{ClassKind, Sample, ShorelineResult};
use serde::{Deserialize, Serialize};

/// Band the coarse water mask is derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoarseWaterSource {
    /// Water where `alpha < factor * std(alpha)` (SWIR is dark over water)
    Alpha,
    /// Water where `value > max(value) - factor * std(value)` (blended water is bright)
    Value,
}

/// Hue/Value threshold parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdParams {
    /// Half-width of the land-typical hue band, in standard deviations
    pub n_hue: f64,
    /// Half-width of the water-typical value band, in standard deviations
    pub n_value: f64,
    pub coarse_source: CoarseWaterSource,
    /// Scale factor on the standard deviation of the coarse source band
    pub coarse_factor: f64,
}

impl ThresholdParams {
    /// Fixed-factor variant: `n_hue = 1`, `n_value = 5`, coarse mask from alpha
    pub fn fixed() -> Self {
        Self {
            n_hue: 1.0,
            n_value: 5.0,
            coarse_source: CoarseWaterSource::Alpha,
            coarse_factor: 1.0,
        }
    }

    /// Tunable variant with the coarse mask taken from Value
    pub fn tunable(n_hue: f64, n_value: f64) -> Self {
        Self {
            n_hue,
            n_value,
            coarse_source: CoarseWaterSource::Value,
            coarse_factor: 1.0,
        }
    }
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self::fixed()
    }
}

/// Threshold statistics and intermediate indicator bands
#[derive(Debug, Clone)]
pub struct ThresholdOutcome {
    /// Provisional water mask used to split the statistics
    pub coarse: Classification,
    /// Value statistics over provisional water
    pub value_stats: BandStatistics,
    /// Hue statistics over provisional land
    pub hue_stats: BandStatistics,
    /// 1 where Value lies inside the water band
    pub value_water: RasterBand,
    /// 1 where Hue lies outside the land band
    pub hue_water: RasterBand,
    /// `value_water AND hue_water`
    pub water: Classification,
}

/// Derives the raw water indicator from Hue and Value statistics
pub struct AdaptiveThresholder {
    params: ThresholdParams,
}

impl AdaptiveThresholder {
    /// Create a thresholder with the given parameters
    pub fn new(params: ThresholdParams) -> Self {
        Self { params }
    }

    /// Get the threshold parameters
    pub fn params(&self) -> &ThresholdParams {
        &self.params
    }

    /// Provisional water mask from the configured source band
    pub fn coarse_water(
        &self,
        alpha: &RasterBand,
        value: &RasterBand,
    ) -> ShorelineResult<Classification> {
        let k = self.params.coarse_factor;
        let band = match self.params.coarse_source {
            CoarseWaterSource::Alpha => {
                let cut = (k * alpha.std()) as Sample;
                alpha.lt(cut)?
            }
            CoarseWaterSource::Value => {
                let stats = value.statistics();
                let cut = (stats.max - k * stats.std) as Sample;
                value.gt(cut)?
            }
        };
        log::debug!(
            "Coarse water mask from {:?}: {} water pixels",
            self.params.coarse_source,
            band.count_true()
        );
        Ok(Classification::new(ClassKind::Water, band))
    }

    /// Full thresholding given a provisional water mask
    pub fn threshold_with(
        &self,
        coarse: Classification,
        hue: &RasterBand,
        value: &RasterBand,
    ) -> ShorelineResult<ThresholdOutcome> {
        let coarse = coarse.into_kind(ClassKind::Water);

        // Value over provisional water, Hue over provisional land
        let value_on_water = value.mask(&coarse.band, true)?;
        let hue_on_land = hue.mask(&coarse.band, false)?;
        let value_stats = value_on_water.statistics();
        let hue_stats = hue_on_land.statistics();

        if value_stats.count == 0 || hue_stats.count == 0 {
            log::warn!(
                "Degenerate threshold statistics: {} provisional water / {} land pixels",
                value_stats.count,
                hue_stats.count
            );
        }
        log::debug!(
            "T_v={:.4} S_v={:.4} T_h={:.4} S_h={:.4}",
            value_stats.median,
            value_stats.std,
            hue_stats.median,
            hue_stats.std
        );

        let nv = self.params.n_value;
        let value_water = value.between(
            (value_stats.median - nv * value_stats.std) as Sample,
            (value_stats.median + nv * value_stats.std) as Sample,
        );

        let nh = self.params.n_hue;
        let hue_land = hue.between(
            (hue_stats.median - nh * hue_stats.std) as Sample,
            (hue_stats.median + nh * hue_stats.std) as Sample,
        );
        let hue_water = hue_land.logical_not();

        let water = value_water.logical_and(&hue_water)?;
        log::info!(
            "Raw water indicator: {} water of {} valid pixels",
            water.count_true(),
            water.valid_count()
        );

        Ok(ThresholdOutcome {
            coarse,
            value_stats,
            hue_stats,
            value_water,
            hue_water,
            water: Classification::new(ClassKind::Water, water),
        })
    }

    /// Coarse water mask, then the statistics-driven water map
    pub fn threshold(
        &self,
        alpha: &RasterBand,
        hue: &RasterBand,
        value: &RasterBand,
    ) -> ShorelineResult<ThresholdOutcome> {
        let coarse = self.coarse_water(alpha, value)?;
        self.threshold_with(coarse, hue, value)
    }
}
