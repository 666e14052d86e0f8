use crate::core::band::RasterBand;
use crate::types::{Sample, ShorelineResult};
use ndarray::Zip;
use serde::{Deserialize, Serialize};

/// Hue formulation
///
/// Both produce hue in [0, 1) with hue 0 where chroma is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HsvMethod {
    /// Normalized channel distances to the maximum (color-library formulation)
    Standard,
    /// Six-sector formula in degrees, divided by 360
    Piecewise,
}

impl Default for HsvMethod {
    fn default() -> Self {
        HsvMethod::Standard
    }
}

/// Hue and Value channels of a synthesized RGB triple
#[derive(Debug, Clone)]
pub struct HueValue {
    pub hue: RasterBand,
    pub value: RasterBand,
}

fn hue_standard(r: f64, g: f64, b: f64, max: f64, chroma: f64) -> f64 {
    let rc = (max - r) / chroma;
    let gc = (max - g) / chroma;
    let bc = (max - b) / chroma;
    let h = if r == max {
        bc - gc
    } else if g == max {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };
    (h / 6.0).rem_euclid(1.0)
}

fn hue_piecewise(r: f64, g: f64, b: f64, max: f64, chroma: f64) -> f64 {
    let degrees = if r == max {
        60.0 * ((g - b) / chroma).rem_euclid(6.0)
    } else if g == max {
        60.0 * ((b - r) / chroma + 2.0)
    } else {
        60.0 * ((r - g) / chroma + 4.0)
    };
    (degrees / 360.0).rem_euclid(1.0)
}

/// Converts RGB bands to Hue and Value bands
#[derive(Debug, Clone, Default)]
pub struct HueValueExtractor {
    method: HsvMethod,
}

impl HueValueExtractor {
    /// Create an extractor using the given hue formula
    pub fn new(method: HsvMethod) -> Self {
        Self { method }
    }

    /// (hue, value) of one pixel; NaN in any channel gives NaN for both
    pub fn pixel(&self, r: Sample, g: Sample, b: Sample) -> (Sample, Sample) {
        if r.is_nan() || g.is_nan() || b.is_nan() {
            return (Sample::NAN, Sample::NAN);
        }
        let (r, g, b) = (r as f64, g as f64, b as f64);
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let chroma = max - min;

        let hue = if chroma == 0.0 {
            0.0
        } else {
            match self.method {
                HsvMethod::Standard => hue_standard(r, g, b, max, chroma),
                HsvMethod::Piecewise => hue_piecewise(r, g, b, max, chroma),
            }
        };
        (hue as Sample, max as Sample)
    }

    /// Hue and Value of the synthesized RGB channels
    pub fn extract(
        &self,
        red: &RasterBand,
        green: &RasterBand,
        blue: &RasterBand,
    ) -> ShorelineResult<HueValue> {
        red.ensure_same_shape(green)?;
        red.ensure_same_shape(blue)?;
        log::debug!("Extracting hue/value with {:?} formula", self.method);

        let mut hue = red.data.clone();
        let mut value = red.data.clone();
        Zip::from(&mut hue)
            .and(&mut value)
            .and(&red.data)
            .and(&green.data)
            .and(&blue.data)
            .for_each(|h, v, &r, &g, &b| {
                let (ph, pv) = self.pixel(r, g, b);
                *h = ph;
                *v = pv;
            });

        Ok(HueValue {
            hue: red.with_data(hue),
            value: red.with_data(value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Crs, GeoTransform};
    use approx::assert_relative_eq;
    use ndarray::{array, Array2};

    fn band(data: Array2<Sample>) -> RasterBand {
        RasterBand::new(data, GeoTransform::default(), Crs::wgs84())
    }

    #[test]
    fn test_primary_colors() {
        let hv = HueValueExtractor::new(HsvMethod::Standard);
        assert_relative_eq!(hv.pixel(1.0, 0.0, 0.0).0, 0.0);
        assert_relative_eq!(hv.pixel(0.0, 1.0, 0.0).0, 1.0 / 3.0, epsilon = 1e-6);
        assert_relative_eq!(hv.pixel(0.0, 0.0, 1.0).0, 2.0 / 3.0, epsilon = 1e-6);
        assert_relative_eq!(hv.pixel(0.2, 0.0, 0.6).1, 0.6);
    }

    #[test]
    fn test_zero_chroma_has_zero_hue() {
        for method in [HsvMethod::Standard, HsvMethod::Piecewise] {
            let hv = HueValueExtractor::new(method);
            let (h, v) = hv.pixel(0.4, 0.4, 0.4);
            assert_eq!(h, 0.0);
            assert_relative_eq!(v, 0.4);
        }
    }

    #[test]
    fn test_both_formulas_agree() {
        let standard = HueValueExtractor::new(HsvMethod::Standard);
        let piecewise = HueValueExtractor::new(HsvMethod::Piecewise);
        let samples = [
            (0.9, 0.1, 0.3),
            (0.9, 0.3, 0.1),
            (0.2, 0.8, 0.5),
            (0.5, 0.6, 0.1),
            (0.1, 0.4, 0.7),
            (0.6, 0.2, 0.7),
            (1.0, 1.0, 0.2),
        ];
        for (r, g, b) in samples {
            let (h1, v1) = standard.pixel(r, g, b);
            let (h2, v2) = piecewise.pixel(r, g, b);
            assert_relative_eq!(h1, h2, epsilon = 1e-6);
            assert_eq!(v1, v2);
            assert!((0.0..1.0).contains(&h1));
        }
    }

    #[test]
    fn test_extract_propagates_nan() {
        let red = band(array![[1.0, Sample::NAN]]);
        let green = band(array![[0.0, 0.5]]);
        let blue = band(array![[0.0, 0.5]]);

        let out = HueValueExtractor::default()
            .extract(&red, &green, &blue)
            .unwrap();
        assert_eq!(out.hue.data[[0, 0]], 0.0);
        assert_eq!(out.value.data[[0, 0]], 1.0);
        assert!(out.hue.data[[0, 1]].is_nan());
        assert!(out.value.data[[0, 1]].is_nan());
    }

    #[test]
    fn test_extract_rejects_mismatched_channels() {
        let red = band(Array2::zeros((2, 2)));
        let green = band(Array2::zeros((2, 3)));
        assert!(HueValueExtractor::default()
            .extract(&red, &green, &red)
            .is_err());
    }
}
