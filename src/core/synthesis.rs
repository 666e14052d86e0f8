use crate::core::band::{Normalization, RasterBand, ResampleMethod};
use crate::core::cloud_mask::{CloudMaskCorrector, INVALID_SENTINEL};
use crate::types::{Sample, ShorelineResult};
use serde::{Deserialize, Serialize};

/// Alpha / RGB synthesis parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisParams {
    /// Bit of the cloud-mask code that flags a pixel as invalid
    pub cloud_bit: u32,
    /// Ratio between the SWIR grid and the visible grid
    pub swir_upscale: usize,
    /// Also invalidate pixels flagged by the edge masks
    pub use_edge_mask: bool,
    /// Sentinel written into invalid pixels before NaN conversion
    pub sentinel: Sample,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            cloud_bit: 0,
            swir_upscale: 2,
            use_edge_mask: false,
            sentinel: INVALID_SENTINEL,
        }
    }
}

/// Cloud-corrected, alpha-blended RGB channels
#[derive(Debug, Clone)]
pub struct SynthesizedRgb {
    pub alpha: RasterBand,
    pub red: RasterBand,
    pub green: RasterBand,
    pub blue: RasterBand,
}

/// Builds the SWIR alpha channel and blends the visible channels with it
pub struct ChannelSynthesizer {
    params: SynthesisParams,
    corrector: CloudMaskCorrector,
}

impl ChannelSynthesizer {
    /// Create a synthesizer with the given parameters
    pub fn new(params: SynthesisParams) -> Self {
        let corrector = CloudMaskCorrector::with_sentinel(params.cloud_bit, params.sentinel);
        Self { params, corrector }
    }

    /// Get the synthesis parameters
    pub fn params(&self) -> &SynthesisParams {
        &self.params
    }

    fn invalidate(
        &self,
        band: &RasterBand,
        cloud_mask: &RasterBand,
        edge_mask: Option<&RasterBand>,
    ) -> ShorelineResult<RasterBand> {
        let mut marked = self.corrector.apply(band, cloud_mask)?;
        if self.params.use_edge_mask {
            if let Some(edge) = edge_mask {
                marked = self.corrector.apply_edge(&marked, edge)?;
            }
        }
        Ok(marked.set_missing(self.params.sentinel, Sample::NAN))
    }

    /// SWIR -> cloud-correct (coarse mask) -> NaN -> min/max -> upscale to the visible grid
    pub fn build_alpha(
        &self,
        swir: &RasterBand,
        cloud_mask: &RasterBand,
        edge_mask: Option<&RasterBand>,
    ) -> ShorelineResult<RasterBand> {
        log::info!("Building alpha channel from SWIR band {:?}", swir.shape());
        let corrected = self.invalidate(swir, cloud_mask, edge_mask)?;
        let normalized = corrected.normalize(Normalization::MinMax);
        let alpha = normalized.upscale(self.params.swir_upscale, ResampleMethod::Nearest)?;
        log::debug!(
            "Alpha channel: {:?}, {} valid pixels",
            alpha.shape(),
            alpha.valid_count()
        );
        Ok(alpha)
    }

    /// Visible band -> cloud-correct (fine mask) -> NaN -> min/max, blended with alpha
    ///
    /// The blend is `(1 - alpha) + alpha * channel`.
    pub fn build_channel(
        &self,
        channel: &RasterBand,
        cloud_mask: &RasterBand,
        edge_mask: Option<&RasterBand>,
        alpha: &RasterBand,
    ) -> ShorelineResult<RasterBand> {
        let corrected = self.invalidate(channel, cloud_mask, edge_mask)?;
        let normalized = corrected.normalize(Normalization::MinMax);
        // Channel first so the result keeps the visible grid's georeferencing
        let weighted = normalized.mul(alpha)?;
        weighted.add(&alpha.rsub(1.0))
    }

    /// Alpha channel plus the three blended visible channels
    pub fn synthesize(&self, inputs: SynthesisInputs<'_>) -> ShorelineResult<SynthesizedRgb> {
        let alpha = self.build_alpha(
            inputs.swir,
            inputs.cloud_mask_coarse,
            inputs.edge_mask_coarse,
        )?;
        let channel = |band: &RasterBand| {
            self.build_channel(band, inputs.cloud_mask_fine, inputs.edge_mask_fine, &alpha)
        };
        let red = channel(inputs.red)?;
        let green = channel(inputs.green)?;
        let blue = channel(inputs.blue)?;
        log::info!("Synthesized RGB channels {:?}", red.shape());
        Ok(SynthesizedRgb {
            alpha,
            red,
            green,
            blue,
        })
    }
}

/// Raw bands and masks of one acquisition
#[derive(Debug, Clone, Copy)]
pub struct SynthesisInputs<'a> {
    pub red: &'a RasterBand,
    pub green: &'a RasterBand,
    pub blue: &'a RasterBand,
    pub swir: &'a RasterBand,
    pub cloud_mask_fine: &'a RasterBand,
    pub cloud_mask_coarse: &'a RasterBand,
    pub edge_mask_fine: Option<&'a RasterBand>,
    pub edge_mask_coarse: Option<&'a RasterBand>,
}
