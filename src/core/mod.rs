//! Core raster algebra and segmentation stages

pub mod band;
pub mod blob_filter;
pub mod boundary;
pub mod classification;
pub mod cloud_mask;
pub mod components;
pub mod convolve;
pub mod georeference;
pub mod hue_value;
pub mod pipeline;
pub mod synthesis;
pub mod threshold;

// Re-export main types
pub use band::{BandStatistics, Normalization, Operand, RasterBand, ResampleMethod, StdCorrection};
pub use blob_filter::{BlobFilter, BlobFilterParams};
pub use boundary::{laplacian_kernel, Boundary, BoundaryExtractor};
pub use classification::Classification;
pub use cloud_mask::{decimals_with_bit, CloudMaskCorrector};
pub use components::{label_components, ComponentLabels};
pub use convolve::ConvolveOptions;
pub use georeference::GeoReferencer;
pub use hue_value::{HsvMethod, HueValue, HueValueExtractor};
pub use pipeline::{ShorelineParams, ShorelinePipeline, ShorelineProduct};
pub use synthesis::{ChannelSynthesizer, SynthesisInputs, SynthesisParams, SynthesizedRgb};
pub use threshold::{AdaptiveThresholder, CoarseWaterSource, ThresholdOutcome, ThresholdParams};
