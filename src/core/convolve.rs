use crate::core::band::RasterBand;
use crate::types::{Sample, ShorelineError, ShorelineResult};
use ndarray::{s, Array2, ArrayView2};

/// Width of the border discarded by `clean_edge`
pub const EDGE_WIDTH: usize = 2;

/// Options for [`RasterBand::convolve`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvolveOptions {
    /// Substitute NaN inputs with this value before correlating
    pub replace_nan: Option<Sample>,
    /// Value assumed outside the grid
    pub fill_value: Sample,
    /// Clamp the response: `>= 1` becomes 1, everything else NaN
    pub nan_mask: bool,
    /// Force the two outermost rows and columns on each side to NaN
    pub clean_edge: bool,
}

impl Default for ConvolveOptions {
    fn default() -> Self {
        Self {
            replace_nan: None,
            fill_value: 0.0,
            nan_mask: false,
            clean_edge: false,
        }
    }
}

impl RasterBand {
    /// Same-size 2D correlation of `kernel` over the band
    pub fn convolve(
        &self,
        kernel: ArrayView2<'_, Sample>,
        options: ConvolveOptions,
    ) -> ShorelineResult<RasterBand> {
        let (kr, kc) = kernel.dim();
        if kr % 2 == 0 || kc % 2 == 0 {
            return Err(ShorelineError::InvalidParameter(format!(
                "kernel dimensions must be odd, got {}x{}",
                kr, kc
            )));
        }

        let source = match options.replace_nan {
            Some(value) => self.set_missing(Sample::NAN, value).data,
            None => self.data.clone(),
        };

        let (rows, cols) = self.shape();
        let (hr, hc) = (kr / 2, kc / 2);

        // Pad once so the inner loop needs no bounds checks
        let mut padded = Array2::from_elem((rows + 2 * hr, cols + 2 * hc), options.fill_value);
        padded
            .slice_mut(s![hr..hr + rows, hc..hc + cols])
            .assign(&source);

        let mut output = Array2::<Sample>::zeros((rows, cols));
        for i in 0..rows {
            for j in 0..cols {
                let window = padded.slice(s![i..i + kr, j..j + kc]);
                let mut acc = 0.0;
                for (w, k) in window.iter().zip(kernel.iter()) {
                    acc += w * k;
                }
                output[[i, j]] = acc;
            }
        }

        if options.nan_mask {
            output.mapv_inplace(|v| if v >= 1.0 { 1.0 } else { Sample::NAN });
        }

        if options.clean_edge {
            let er = EDGE_WIDTH.min(rows);
            let ec = EDGE_WIDTH.min(cols);
            output.slice_mut(s![..er, ..]).fill(Sample::NAN);
            output.slice_mut(s![rows - er.., ..]).fill(Sample::NAN);
            output.slice_mut(s![.., ..ec]).fill(Sample::NAN);
            output.slice_mut(s![.., cols - ec..]).fill(Sample::NAN);
        }

        Ok(self.with_data(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Crs, GeoTransform};
    use ndarray::array;

    fn band(data: Array2<Sample>) -> RasterBand {
        RasterBand::new(data, GeoTransform::default(), Crs::wgs84())
    }

    #[test]
    fn test_identity_kernel() {
        let data = Array2::from_shape_fn((4, 5), |(i, j)| (i * 5 + j) as Sample);
        let kernel = array![[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]];
        let out = band(data.clone())
            .convolve(kernel.view(), ConvolveOptions::default())
            .unwrap();
        assert_eq!(out.data, data);
    }

    #[test]
    fn test_zero_fill_boundary() {
        let data = Array2::<Sample>::ones((3, 3));
        let kernel = Array2::<Sample>::ones((3, 3));
        let out = band(data)
            .convolve(kernel.view(), ConvolveOptions::default())
            .unwrap();
        assert_eq!(out.data[[0, 0]], 4.0);
        assert_eq!(out.data[[0, 1]], 6.0);
        assert_eq!(out.data[[1, 1]], 9.0);
    }

    #[test]
    fn test_nan_spreads_unless_replaced() {
        let data = array![[1.0, 1.0, 1.0], [1.0, Sample::NAN, 1.0], [1.0, 1.0, 1.0]];
        let kernel = Array2::<Sample>::ones((3, 3));

        let spread = band(data.clone())
            .convolve(kernel.view(), ConvolveOptions::default())
            .unwrap();
        assert!(spread.data.iter().all(|v| v.is_nan()));

        let replaced = band(data)
            .convolve(
                kernel.view(),
                ConvolveOptions {
                    replace_nan: Some(0.0),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(replaced.data[[1, 1]], 8.0);
    }

    #[test]
    fn test_clean_edge_trims_two_pixels() {
        let data = Array2::from_shape_fn((9, 7), |(i, j)| ((i + j) % 3) as Sample);
        let kernel = array![[0.0, -1.0, 0.0], [-1.0, 4.0, -1.0], [0.0, -1.0, 0.0]];
        let out = band(data)
            .convolve(
                kernel.view(),
                ConvolveOptions {
                    clean_edge: true,
                    ..Default::default()
                },
            )
            .unwrap();

        let (rows, cols) = out.shape();
        for i in 0..rows {
            for j in 0..cols {
                let on_edge = i < 2 || i >= rows - 2 || j < 2 || j >= cols - 2;
                if on_edge {
                    assert!(out.data[[i, j]].is_nan(), "({}, {}) not trimmed", i, j);
                } else {
                    assert!(!out.data[[i, j]].is_nan());
                }
            }
        }
    }

    #[test]
    fn test_nan_mask_clamps_response() {
        let data = array![[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]];
        let kernel = array![[0.0, -1.0, 0.0], [-1.0, 4.0, -1.0], [0.0, -1.0, 0.0]];
        let out = band(data)
            .convolve(
                kernel.view(),
                ConvolveOptions {
                    nan_mask: true,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(out.data[[1, 1]], 1.0);
        assert!(out.data[[0, 1]].is_nan());
        assert_eq!(out.count_true(), 1);
    }

    #[test]
    fn test_even_kernel_rejected() {
        let kernel = Array2::<Sample>::ones((2, 2));
        assert!(band(Array2::zeros((3, 3)))
            .convolve(kernel.view(), ConvolveOptions::default())
            .is_err());
    }
}
