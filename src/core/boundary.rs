use crate::core::band::RasterBand;
use crate::core::convolve::ConvolveOptions;
use crate::core::Classification;
use crate::types::{ClassKind, Sample, ShorelineResult};
use ndarray::{array, Array2};

/// Discrete 4-neighbour Laplacian
pub fn laplacian_kernel() -> Array2<Sample> {
    array![[0.0, -1.0, 0.0], [-1.0, 4.0, -1.0], [0.0, -1.0, 0.0]]
}

/// Water/land interface pixels of a cleaned classification
#[derive(Debug, Clone)]
pub struct Boundary {
    /// 1 on shoreline pixels, NaN elsewhere
    pub band: RasterBand,
    /// (row, col) of every shoreline pixel, row-major order
    pub pixels: Vec<(usize, usize)>,
}

impl Boundary {
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }
}

/// Finds water pixels whose 4-neighbourhood contains land
#[derive(Debug, Clone, Default)]
pub struct BoundaryExtractor;

impl BoundaryExtractor {
    /// Create an extractor using [`laplacian_kernel`]
    pub fn new() -> Self {
        Self
    }

    /// Water pixels next to land, excluding the trimmed edge
    pub fn extract(&self, cleaned: &Classification) -> ShorelineResult<Boundary> {
        let water = cleaned.to_kind(ClassKind::Water);
        let kernel = laplacian_kernel();

        let response = water.band.convolve(
            kernel.view(),
            ConvolveOptions {
                replace_nan: None,
                fill_value: 0.0,
                nan_mask: true,
                clean_edge: true,
            },
        )?;
        // NaN spreads through the window, so pixels touching no-data never respond
        let band = response.restore_nodata(&water.band)?;

        let pixels: Vec<(usize, usize)> = band
            .data
            .indexed_iter()
            .filter(|(_, &v)| v == 1.0)
            .map(|(idx, _)| idx)
            .collect();

        log::info!("Boundary extraction: {} shoreline pixels", pixels.len());
        Ok(Boundary { band, pixels })
    }
}
