use crate::core::band::RasterBand;
use crate::types::{Sample, ShorelineError, ShorelineResult};
use ndarray::Zip;

/// Marker written into invalid pixels before they become NaN
///
/// Large and negative so it cannot collide with a reflectance value.
pub const INVALID_SENTINEL: Sample = -10000.0;

/// Largest code a CLM/EDG mask can hold (the masks are 8-bit)
pub const MAX_MASK_CODE: u32 = u8::MAX as u32;

/// Every integer in `[0, max_value]` whose bit `bit` is set
pub fn decimals_with_bit(max_value: u32, bit: u32) -> Vec<u32> {
    if bit >= u32::BITS {
        return Vec::new();
    }
    let flag = 1u32 << bit;
    (0..=max_value).filter(|code| code & flag != 0).collect()
}

/// Turns bitfield mask rasters into invalid-pixel markers on a data band
#[derive(Debug, Clone)]
pub struct CloudMaskCorrector {
    bit: u32,
    sentinel: Sample,
}

impl CloudMaskCorrector {
    /// Corrector for mask bit `bit`, marking with [`INVALID_SENTINEL`]
    pub fn new(bit: u32) -> Self {
        Self {
            bit,
            sentinel: INVALID_SENTINEL,
        }
    }

    /// Corrector with a custom marker value
    pub fn with_sentinel(bit: u32, sentinel: Sample) -> Self {
        Self { bit, sentinel }
    }

    /// Marker written into flagged pixels
    pub fn sentinel(&self) -> Sample {
        self.sentinel
    }

    /// Write the sentinel wherever the mask code has the configured bit set
    ///
    /// Masks holding codes above [`MAX_MASK_CODE`] are rejected.
    pub fn apply(&self, band: &RasterBand, mask: &RasterBand) -> ShorelineResult<RasterBand> {
        band.ensure_same_shape(mask).map_err(|e| match e {
            ShorelineError::ShapeMismatch { expected, actual } => {
                ShorelineError::Processing(format!(
                    "cloud mask grid {:?} does not match band grid {:?}; \
                     use the mask of the band's resolution",
                    actual, expected
                ))
            }
            other => other,
        })?;

        let max_code = mask.max();
        if max_code.is_nan() || max_code < 1.0 {
            log::debug!("Cloud mask carries no flagged codes");
            return Ok(band.clone());
        }
        if max_code > MAX_MASK_CODE as f64 {
            return Err(ShorelineError::InvalidFormat(format!(
                "cloud mask code {} exceeds the 8-bit range [0, {}]",
                max_code, MAX_MASK_CODE
            )));
        }

        let codes = decimals_with_bit(max_code as u32, self.bit);
        log::debug!(
            "Cloud mask: {} codes in [0, {}] carry bit {}",
            codes.len(),
            max_code,
            self.bit
        );

        let data = Zip::from(&band.data).and(&mask.data).map_collect(|&v, &m| {
            if !m.is_nan() && m >= 0.0 && codes.binary_search(&(m as u32)).is_ok() {
                self.sentinel
            } else {
                v
            }
        });
        Ok(band.with_data(data))
    }

    /// Write the sentinel wherever an edge (no-data) mask is non-zero
    pub fn apply_edge(&self, band: &RasterBand, edge: &RasterBand) -> ShorelineResult<RasterBand> {
        band.ensure_same_shape(edge)?;
        let data = Zip::from(&band.data).and(&edge.data).map_collect(|&v, &m| {
            if !m.is_nan() && m != 0.0 {
                self.sentinel
            } else {
                v
            }
        });
        Ok(band.with_data(data))
    }

    /// Mask, then turn the sentinel into NaN
    pub fn correct(&self, band: &RasterBand, mask: &RasterBand) -> ShorelineResult<RasterBand> {
        Ok(self
            .apply(band, mask)?
            .set_missing(self.sentinel, Sample::NAN))
    }
}

impl Default for CloudMaskCorrector {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Crs, GeoTransform};
    use ndarray::{array, Array2};

    fn band(data: Array2<Sample>) -> RasterBand {
        RasterBand::new(data, GeoTransform::default(), Crs::Epsg(32630))
    }

    #[test]
    fn test_decimals_with_bit_zero() {
        assert_eq!(decimals_with_bit(15, 0), vec![1, 3, 5, 7, 9, 11, 13, 15]);
    }

    #[test]
    fn test_decimals_with_higher_bit() {
        assert_eq!(decimals_with_bit(7, 2), vec![4, 5, 6, 7]);
        assert!(decimals_with_bit(3, 2).is_empty());
        assert!(decimals_with_bit(10, 40).is_empty());
    }

    #[test]
    fn test_apply_marks_flagged_pixels() {
        let data = band(array![[0.1, 0.2], [0.3, 0.4]]);
        let mask = band(array![[0.0, 1.0], [2.0, 3.0]]);

        let corrector = CloudMaskCorrector::new(0);
        let marked = corrector.apply(&data, &mask).unwrap();
        assert_eq!(marked.data[[0, 0]], 0.1);
        assert_eq!(marked.data[[0, 1]], INVALID_SENTINEL);
        assert_eq!(marked.data[[1, 0]], 0.3);
        assert_eq!(marked.data[[1, 1]], INVALID_SENTINEL);

        let corrected = corrector.correct(&data, &mask).unwrap();
        assert!(corrected.data[[0, 1]].is_nan());
        assert_eq!(corrected.valid_count(), 2);
    }

    #[test]
    fn test_apply_rejects_codes_beyond_eight_bits() {
        let data = band(array![[0.1, 0.2]]);
        let mask = band(array![[0.0, 4.0e9]]);
        assert!(matches!(
            CloudMaskCorrector::default().apply(&data, &mask),
            Err(ShorelineError::InvalidFormat(_))
        ));

        // The largest 8-bit code is still accepted
        let full = band(array![[0.0, 255.0]]);
        let marked = CloudMaskCorrector::default().apply(&data, &full).unwrap();
        assert_eq!(marked.data[[0, 1]], INVALID_SENTINEL);
    }

    #[test]
    fn test_apply_rejects_other_resolution() {
        let data = band(Array2::zeros((4, 4)));
        let mask = band(Array2::zeros((2, 2)));
        assert!(CloudMaskCorrector::default().apply(&data, &mask).is_err());
    }

    #[test]
    fn test_edge_mask() {
        let data = band(array![[0.1, 0.2]]);
        let edge = band(array![[1.0, 0.0]]);
        let marked = CloudMaskCorrector::default().apply_edge(&data, &edge).unwrap();
        assert_eq!(marked.data[[0, 0]], INVALID_SENTINEL);
        assert_eq!(marked.data[[0, 1]], 0.2);
    }
}
