use crate::core::Classification;
use crate::types::{ClassKind, ShorelineResult};
use serde::{Deserialize, Serialize};

/// Connected-component size thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobFilterParams {
    /// Water blobs smaller than this many pixels become land
    pub waterblob: usize,
    /// Land blobs smaller than this many pixels become water
    pub landblob: usize,
}

impl Default for BlobFilterParams {
    fn default() -> Self {
        Self {
            waterblob: 1000,
            landblob: 1000,
        }
    }
}

/// Two-pass size filter: water speckle first, then land speckle
pub struct BlobFilter {
    params: BlobFilterParams,
}

impl BlobFilter {
    /// Create a blob filter with the given minimum blob sizes
    pub fn new(params: BlobFilterParams) -> Self {
        Self { params }
    }

    /// Get the filter parameters
    pub fn params(&self) -> &BlobFilterParams {
        &self.params
    }

    /// Clean a classification; the result always has water polarity
    pub fn apply(&self, raw: Classification) -> ShorelineResult<Classification> {
        let water = raw.into_kind(ClassKind::Water);
        let before = water.count();

        // Pass 1: drop small water blobs
        let large_water = water.band.clean(self.params.waterblob, 1.0, false);
        // Pass 2: small land blobs (complement components) are merged into water.
        // Without any water left the complement of max - data is empty, so skip it.
        let filled = if large_water.count_true() == 0 {
            large_water
        } else {
            large_water.clean(self.params.landblob, 0.0, true)
        };

        // Labeling sees no-data as background; put it back
        let cleaned = filled.restore_nodata(&water.band)?;

        log::info!(
            "Blob filter (waterblob={}, landblob={}): {} -> {} water pixels",
            self.params.waterblob,
            self.params.landblob,
            before,
            cleaned.count_true()
        );
        Ok(Classification::water(cleaned))
    }
}
