//! shoreline: water/land segmentation and shoreline extraction for Sentinel-2 L2A
//!
//! Reflectance bands and cloud masks of one acquisition are blended into a
//! synthetic RGB image, split into water and land with data-driven Hue/Value
//! thresholds, cleaned of small connected blobs, and the water/land interface
//! is written out as geographic coordinates.

pub mod batch;
pub mod core;
pub mod io;
pub mod types;

// Re-export main types and functions for easier access
pub use types::{
    AcquisitionInfo, BoundingBox, ClassKind, Crs, GeoTransform, Sample, ShorelineError,
    ShorelinePoint, ShorelineResult,
};

pub use crate::core::{
    Classification, RasterBand, ShorelineParams, ShorelinePipeline, ShorelineProduct,
};
pub use batch::{BatchConfig, BatchReport, BatchRunner};
pub use io::{OutputLayout, TileProduct};
