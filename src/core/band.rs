use crate::types::{Crs, GeoTransform, Sample, ShorelineError, ShorelineResult};
use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};

/// Right-hand side of an elementwise band operation
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    Scalar(Sample),
    Band(&'a RasterBand),
}

impl From<Sample> for Operand<'_> {
    fn from(value: Sample) -> Self {
        Operand::Scalar(value)
    }
}

impl<'a> From<&'a RasterBand> for Operand<'a> {
    fn from(band: &'a RasterBand) -> Self {
        Operand::Band(band)
    }
}

/// Resampling kernel for `upscale`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResampleMethod {
    Nearest,
    Bilinear,
}

/// Which tail(s) the `Std` normalization clips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StdCorrection {
    High,
    Low,
    Both,
}

/// Normalization variants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Normalization {
    /// Linear rescale to [0, 1] from the band's own min/max
    MinMax,
    /// Clip beyond `std_factor` standard deviations of the mean, then min/max
    Std {
        std_factor: f64,
        correction: StdCorrection,
    },
    /// Clip above the given percentile (0..=100), then min/max
    Percentile { percentile: f64 },
}

/// NaN-aware summary of a set of samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandStatistics {
    pub count: usize,
    pub median: f64,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl BandStatistics {
    /// Statistics of the finite values in `values`; NaN everywhere when empty
    pub fn from_values(mut values: Vec<f64>) -> Self {
        values.retain(|v| !v.is_nan());
        let moments = values.iter().fold(Moments::default(), |m, &v| m.push(v));
        moments.with_median(median_of(&mut values))
    }
}

/// Single-pass count, mean, variance and range of the finite samples
#[derive(Debug, Clone, Copy)]
pub(crate) struct Moments {
    count: usize,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl Default for Moments {
    fn default() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl Moments {
    /// Welford update; NaN is skipped
    pub(crate) fn push(mut self, value: f64) -> Self {
        if value.is_nan() {
            return self;
        }
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub(crate) fn mean(&self) -> f64 {
        if self.is_empty() {
            f64::NAN
        } else {
            self.mean
        }
    }

    /// Population standard deviation
    pub(crate) fn std(&self) -> f64 {
        if self.is_empty() {
            f64::NAN
        } else {
            (self.m2 / self.count as f64).sqrt()
        }
    }

    pub(crate) fn min(&self) -> f64 {
        if self.is_empty() {
            f64::NAN
        } else {
            self.min
        }
    }

    pub(crate) fn max(&self) -> f64 {
        if self.is_empty() {
            f64::NAN
        } else {
            self.max
        }
    }

    fn with_median(self, median: f64) -> BandStatistics {
        BandStatistics {
            count: self.count,
            median,
            mean: self.mean(),
            std: self.std(),
            min: self.min(),
            max: self.max(),
        }
    }
}

/// Median by partial selection; reorders `values`, which must hold no NaN
fn median_of(values: &mut [f64]) -> f64 {
    let count = values.len();
    if count == 0 {
        return f64::NAN;
    }
    let (lower, upper, _) = values.select_nth_unstable_by(count / 2, |a, b| a.total_cmp(b));
    let upper = *upper;
    if count % 2 == 1 {
        upper
    } else {
        let below = lower.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        0.5 * (below + upper)
    }
}

/// Linear-interpolated percentile (`p` in 0..=100); reorders `values`
pub(crate) fn percentile_of(values: &mut [f64], p: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let rank = (p.clamp(0.0, 100.0) / 100.0) * (values.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let frac = rank - lo as f64;
    let (_, at_lo, above) = values.select_nth_unstable_by(lo, |a, b| a.total_cmp(b));
    let at_lo = *at_lo;
    if frac == 0.0 || above.is_empty() {
        return at_lo;
    }
    let at_hi = above.iter().copied().fold(f64::INFINITY, f64::min);
    at_lo + (at_hi - at_lo) * frac
}

/// Non-NaN, non-zero samples are "true"
#[inline]
pub(crate) fn truthy(value: Sample) -> bool {
    !value.is_nan() && value != 0.0
}

#[inline]
fn bool_sample(value: bool) -> Sample {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Single-layer raster grid with its georeferencing
///
/// NaN marks "no information" and propagates through every elementwise
/// operation. Operations never mutate `self`; they return a new band that
/// inherits the geotransform and projection of `self`.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterBand {
    pub data: Array2<Sample>,
    pub geotransform: GeoTransform,
    pub projection: Crs,
}

impl RasterBand {
    /// Create a band from samples and georeferencing
    pub fn new(data: Array2<Sample>, geotransform: GeoTransform, projection: Crs) -> Self {
        Self {
            data,
            geotransform,
            projection,
        }
    }

    /// Band with the same georeferencing as `self` and new samples
    pub fn with_data(&self, data: Array2<Sample>) -> Self {
        Self {
            data,
            geotransform: self.geotransform,
            projection: self.projection.clone(),
        }
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Number of non-NaN samples
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|v| !v.is_nan()).count()
    }

    /// Number of non-NaN, non-zero samples
    pub fn count_true(&self) -> usize {
        self.data.iter().filter(|&&v| truthy(v)).count()
    }

    /// Fail with `ShapeMismatch` unless both grids have the same shape
    pub fn ensure_same_shape(&self, other: &RasterBand) -> ShorelineResult<()> {
        if self.shape() != other.shape() {
            return Err(ShorelineError::ShapeMismatch {
                expected: self.shape(),
                actual: other.shape(),
            });
        }
        Ok(())
    }

    /// Apply `f` to each sample; NaN inputs stay NaN
    pub fn map(&self, f: impl Fn(Sample) -> Sample) -> RasterBand {
        self.with_data(self.data.mapv(|v| if v.is_nan() { v } else { f(v) }))
    }

    /// Combine with a scalar or a same-shape band; NaN in either side yields NaN
    pub fn zip_with<'a>(
        &self,
        rhs: impl Into<Operand<'a>>,
        f: impl Fn(Sample, Sample) -> Sample,
    ) -> ShorelineResult<RasterBand> {
        let combine = |a: Sample, b: Sample| {
            if a.is_nan() || b.is_nan() {
                Sample::NAN
            } else {
                f(a, b)
            }
        };
        match rhs.into() {
            Operand::Scalar(s) => Ok(self.with_data(self.data.mapv(|a| combine(a, s)))),
            Operand::Band(other) => {
                self.ensure_same_shape(other)?;
                let data = Zip::from(&self.data)
                    .and(&other.data)
                    .map_collect(|&a, &b| combine(a, b));
                Ok(self.with_data(data))
            }
        }
    }

    /// Elementwise sum
    pub fn add<'a>(&self, rhs: impl Into<Operand<'a>>) -> ShorelineResult<RasterBand> {
        self.zip_with(rhs, |a, b| a + b)
    }

    /// Elementwise difference
    pub fn sub<'a>(&self, rhs: impl Into<Operand<'a>>) -> ShorelineResult<RasterBand> {
        self.zip_with(rhs, |a, b| a - b)
    }

    /// Elementwise product
    pub fn mul<'a>(&self, rhs: impl Into<Operand<'a>>) -> ShorelineResult<RasterBand> {
        self.zip_with(rhs, |a, b| a * b)
    }

    /// Division; x/0 follows IEEE rules (±inf, or NaN for 0/0)
    pub fn div<'a>(&self, rhs: impl Into<Operand<'a>>) -> ShorelineResult<RasterBand> {
        self.zip_with(rhs, |a, b| a / b)
    }

    /// `scalar - self`
    pub fn rsub(&self, scalar: Sample) -> RasterBand {
        self.map(|v| scalar - v)
    }

    /// 1 where `self > rhs`, else 0
    pub fn gt<'a>(&self, rhs: impl Into<Operand<'a>>) -> ShorelineResult<RasterBand> {
        self.zip_with(rhs, |a, b| bool_sample(a > b))
    }

    /// 1 where `self >= rhs`, else 0
    pub fn ge<'a>(&self, rhs: impl Into<Operand<'a>>) -> ShorelineResult<RasterBand> {
        self.zip_with(rhs, |a, b| bool_sample(a >= b))
    }

    /// 1 where `self < rhs`, else 0
    pub fn lt<'a>(&self, rhs: impl Into<Operand<'a>>) -> ShorelineResult<RasterBand> {
        self.zip_with(rhs, |a, b| bool_sample(a < b))
    }

    /// 1 where `self <= rhs`, else 0
    pub fn le<'a>(&self, rhs: impl Into<Operand<'a>>) -> ShorelineResult<RasterBand> {
        self.zip_with(rhs, |a, b| bool_sample(a <= b))
    }

    /// 1 where `low < self < high`, 0 outside, NaN where self or a bound is NaN
    pub fn between(&self, low: Sample, high: Sample) -> RasterBand {
        if low.is_nan() || high.is_nan() {
            return self.with_data(Array2::from_elem(self.shape(), Sample::NAN));
        }
        self.map(|v| bool_sample(low < v && v < high))
    }

    /// 1 where both samples are non-zero
    pub fn logical_and(&self, other: &RasterBand) -> ShorelineResult<RasterBand> {
        self.zip_with(other, |a, b| bool_sample(a != 0.0 && b != 0.0))
    }

    /// 1 where either sample is non-zero
    pub fn logical_or(&self, other: &RasterBand) -> ShorelineResult<RasterBand> {
        self.zip_with(other, |a, b| bool_sample(a != 0.0 || b != 0.0))
    }

    /// 1 where the sample is zero; NaN stays NaN
    pub fn logical_not(&self) -> RasterBand {
        self.map(|v| bool_sample(v == 0.0))
    }

    /// Replace every occurrence of `value` (every NaN when `value` is NaN) by `to`
    pub fn set_missing(&self, value: Sample, to: Sample) -> RasterBand {
        let data = if value.is_nan() {
            self.data.mapv(|v| if v.is_nan() { to } else { v })
        } else {
            self.data.mapv(|v| if v == value { to } else { v })
        };
        self.with_data(data)
    }

    /// Replicate each sample `factor` x `factor` times
    pub fn upscale(&self, factor: usize, method: ResampleMethod) -> ShorelineResult<RasterBand> {
        if method != ResampleMethod::Nearest {
            return Err(ShorelineError::NotImplemented(format!(
                "{:?} upscaling",
                method
            )));
        }
        if factor == 0 {
            return Err(ShorelineError::InvalidParameter(
                "upscale factor must be at least 1".to_string(),
            ));
        }

        let (rows, cols) = self.shape();
        let data = Array2::from_shape_fn((rows * factor, cols * factor), |(i, j)| {
            self.data[[i / factor, j / factor]]
        });
        log::debug!(
            "Upscaled {}x{} -> {}x{} (factor {})",
            rows,
            cols,
            rows * factor,
            cols * factor,
            factor
        );

        Ok(RasterBand {
            data,
            geotransform: self.geotransform.refined(factor),
            projection: self.projection.clone(),
        })
    }

    /// Rescale the finite samples to [0, 1] after optional clipping
    pub fn normalize(&self, method: Normalization) -> RasterBand {
        match method {
            Normalization::MinMax => self.minmax(),
            Normalization::Std {
                std_factor,
                correction,
            } => {
                let moments = self.moments();
                let high = (moments.mean() + std_factor * moments.std()) as Sample;
                let low = (moments.mean() - std_factor * moments.std()) as Sample;
                let clipped = self.map(|v| match correction {
                    StdCorrection::High => v.min(high),
                    StdCorrection::Low => v.max(low),
                    StdCorrection::Both => v.min(high).max(low),
                });
                clipped.minmax()
            }
            Normalization::Percentile { percentile } => {
                let mut values = self.finite_values();
                let cap = percentile_of(&mut values, percentile) as Sample;
                self.map(|v| v.min(cap)).minmax()
            }
        }
    }

    fn minmax(&self) -> RasterBand {
        let moments = self.moments();
        let (min, max) = (moments.min() as Sample, moments.max() as Sample);
        if !(max > min) {
            log::warn!(
                "Min/max normalization of a band with range [{}, {}] is undefined",
                min,
                max
            );
        }
        let range = max - min;
        self.map(|v| (v - min) / range)
    }

    /// NaN wherever `by` is true (or false when `inverse`), and wherever `by` is NaN
    pub fn mask(&self, by: &RasterBand, inverse: bool) -> ShorelineResult<RasterBand> {
        self.ensure_same_shape(by)?;
        let data = Zip::from(&self.data).and(&by.data).map_collect(|&v, &m| {
            if m.is_nan() || truthy(m) != inverse {
                Sample::NAN
            } else {
                v
            }
        });
        Ok(self.with_data(data))
    }

    /// NaN wherever `reference` is NaN
    pub fn restore_nodata(&self, reference: &RasterBand) -> ShorelineResult<RasterBand> {
        self.ensure_same_shape(reference)?;
        let data = Zip::from(&self.data)
            .and(&reference.data)
            .map_collect(|&v, &r| if r.is_nan() { Sample::NAN } else { v });
        Ok(self.with_data(data))
    }

    /// Finite samples as `f64`, in row-major order
    pub fn finite_values(&self) -> Vec<f64> {
        self.data
            .iter()
            .filter(|v| !v.is_nan())
            .map(|&v| v as f64)
            .collect()
    }

    pub(crate) fn moments(&self) -> Moments {
        self.data
            .iter()
            .fold(Moments::default(), |m, &v| m.push(v as f64))
    }

    /// Full NaN-aware summary; the only statistic that copies the samples
    pub fn statistics(&self) -> BandStatistics {
        let mut values = self.finite_values();
        let median = median_of(&mut values);
        self.moments().with_median(median)
    }

    /// Statistics restricted to pixels where `selector` is true
    pub fn statistics_where(&self, selector: &RasterBand) -> ShorelineResult<BandStatistics> {
        self.ensure_same_shape(selector)?;
        let mut values = Vec::new();
        Zip::from(&self.data).and(&selector.data).for_each(|&v, &s| {
            if truthy(s) && !v.is_nan() {
                values.push(v as f64);
            }
        });
        let moments = values.iter().fold(Moments::default(), |m, &v| m.push(v));
        Ok(moments.with_median(median_of(&mut values)))
    }

    /// Median of the finite samples
    pub fn median(&self) -> f64 {
        median_of(&mut self.finite_values())
    }

    /// Population standard deviation of the finite samples
    pub fn std(&self) -> f64 {
        self.moments().std()
    }

    /// Largest finite sample; NaN when there is none
    pub fn max(&self) -> f64 {
        self.data
            .iter()
            .filter(|v| !v.is_nan())
            .fold(f64::NAN, |acc, &v| acc.max(v as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn band(data: Array2<Sample>) -> RasterBand {
        RasterBand::new(data, GeoTransform::default(), Crs::wgs84())
    }

    #[test]
    fn test_nan_propagates_through_arithmetic() {
        let a = band(array![[1.0, Sample::NAN], [3.0, 4.0]]);
        let b = band(array![[1.0, 2.0], [Sample::NAN, 4.0]]);

        for result in [
            a.add(&b).unwrap(),
            a.sub(&b).unwrap(),
            a.mul(&b).unwrap(),
            a.div(&b).unwrap(),
            a.gt(&b).unwrap(),
            a.le(&b).unwrap(),
            a.logical_and(&b).unwrap(),
            a.logical_or(&b).unwrap(),
        ] {
            assert!(result.data[[0, 1]].is_nan());
            assert!(result.data[[1, 0]].is_nan());
            assert!(!result.data[[0, 0]].is_nan());
        }
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let a = band(Array2::zeros((3, 3)));
        let b = band(Array2::zeros((3, 4)));

        assert!(matches!(
            a.add(&b),
            Err(ShorelineError::ShapeMismatch { .. })
        ));
        assert!(a.mask(&b, false).is_err());
        assert!(a.logical_and(&b).is_err());
        assert!(a.statistics_where(&b).is_err());
    }

    #[test]
    fn test_comparisons_with_scalar() {
        let a = band(array![[0.1, 0.5, 0.9]]);
        assert_eq!(a.gt(0.5 as Sample).unwrap().data, array![[0.0, 0.0, 1.0]]);
        assert_eq!(a.ge(0.5 as Sample).unwrap().data, array![[0.0, 1.0, 1.0]]);
        assert_eq!(a.lt(Sample::NAN).unwrap().valid_count(), 0);
        assert_eq!(a.between(0.2, 1.0).data, array![[0.0, 1.0, 1.0]]);
        assert_eq!(a.between(Sample::NAN, 1.0).valid_count(), 0);
    }

    #[test]
    fn test_logical_not_keeps_nan() {
        let a = band(array![[1.0, 0.0, Sample::NAN]]);
        let not = a.logical_not();
        assert_eq!(not.data[[0, 0]], 0.0);
        assert_eq!(not.data[[0, 1]], 1.0);
        assert!(not.data[[0, 2]].is_nan());
    }

    #[test]
    fn test_set_missing() {
        let a = band(array![[-10000.0, 2.0, Sample::NAN]]);
        let b = a.set_missing(-10000.0, Sample::NAN);
        assert!(b.data[[0, 0]].is_nan());
        assert_eq!(b.data[[0, 1]], 2.0);

        let c = a.set_missing(Sample::NAN, 0.0);
        assert_eq!(c.data[[0, 2]], 0.0);
    }

    #[test]
    fn test_upscale_nearest() {
        let a = RasterBand::new(
            array![[1.0, 2.0], [3.0, 4.0]],
            GeoTransform::new(500.0, 1000.0, 20.0, -20.0),
            Crs::Epsg(32630),
        );
        let up = a.upscale(2, ResampleMethod::Nearest).unwrap();

        assert_eq!(up.shape(), (4, 4));
        assert_eq!(up.data[[0, 1]], 1.0);
        assert_eq!(up.data[[3, 3]], 4.0);
        assert_eq!(up.data[[2, 1]], 3.0);
        assert_relative_eq!(up.geotransform.pixel_width, 10.0);
        assert_relative_eq!(up.geotransform.pixel_height, -10.0);
        assert_relative_eq!(up.geotransform.top_left_x, 500.0);

        // Same world footprint
        assert_eq!(up.geotransform.bounds(4, 4), a.geotransform.bounds(2, 2));
    }

    #[test]
    fn test_upscale_bilinear_not_implemented() {
        let a = band(Array2::zeros((2, 2)));
        assert!(matches!(
            a.upscale(2, ResampleMethod::Bilinear),
            Err(ShorelineError::NotImplemented(_))
        ));
    }

    #[test]
    fn test_minmax_normalization_is_idempotent() {
        let a = band(array![[2.0, 4.0], [Sample::NAN, 10.0]]);
        let once = a.normalize(Normalization::MinMax);
        let twice = once.normalize(Normalization::MinMax);

        assert_relative_eq!(once.data[[0, 0]], 0.0);
        assert_relative_eq!(once.data[[0, 1]], 0.25);
        assert_relative_eq!(once.data[[1, 1]], 1.0);
        assert!(once.data[[1, 0]].is_nan());
        for (x, y) in once.data.iter().zip(twice.data.iter()) {
            assert!((x.is_nan() && y.is_nan()) || (x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_std_normalization_clips_outlier() {
        let mut values = vec![1.0; 99];
        values.push(1000.0);
        values[0] = 0.0;
        let a = band(Array2::from_shape_vec((10, 10), values).unwrap());

        let n = a.normalize(Normalization::Std {
            std_factor: 1.0,
            correction: StdCorrection::High,
        });
        // Outlier clipped to the cap, which becomes the new maximum
        assert_relative_eq!(n.data[[9, 9]], 1.0);
        assert!(n.data[[0, 1]] > 0.0);
        assert_relative_eq!(n.data[[0, 0]], 0.0);
    }

    #[test]
    fn test_std_normalization_clips_low_tail() {
        let mut values = vec![1.0; 100];
        values[0] = -1000.0;
        values[1] = 2.0;
        let a = band(Array2::from_shape_vec((10, 10), values).unwrap());
        let stats = a.statistics();
        let low = (stats.mean - stats.std) as Sample;

        let n = a.normalize(Normalization::Std {
            std_factor: 1.0,
            correction: StdCorrection::Low,
        });
        // Outlier lifted to mean - std, which becomes the new minimum
        assert_relative_eq!(n.data[[0, 0]], 0.0);
        assert_relative_eq!(n.data[[0, 1]], 1.0);
        assert_relative_eq!(n.data[[0, 2]], (1.0 - low) / (2.0 - low), epsilon = 1e-6);
        assert!(n.data[[0, 2]] < 0.995);
    }

    #[test]
    fn test_std_normalization_clips_both_tails() {
        let mut values = vec![1.0; 100];
        values[0] = -1000.0;
        values[1] = 500.0;
        let a = band(Array2::from_shape_vec((10, 10), values).unwrap());
        let stats = a.statistics();
        let low = (stats.mean - stats.std) as Sample;
        let high = (stats.mean + stats.std) as Sample;
        assert!(low > -1000.0 && high < 500.0);

        let n = a.normalize(Normalization::Std {
            std_factor: 1.0,
            correction: StdCorrection::Both,
        });
        assert_relative_eq!(n.data[[0, 0]], 0.0);
        assert_relative_eq!(n.data[[0, 1]], 1.0);
        let expected = (1.0 - low) / (high - low);
        assert_relative_eq!(n.data[[0, 2]], expected, epsilon = 1e-6);
        // Unclipped, the bulk would sit at 1001 / 1500
        assert!((n.data[[0, 2]] - 1001.0 / 1500.0).abs() > 0.1);

        let high_only = a.normalize(Normalization::Std {
            std_factor: 1.0,
            correction: StdCorrection::High,
        });
        let expected = (1.0 + 1000.0) / (high + 1000.0);
        assert_relative_eq!(high_only.data[[0, 2]], expected, epsilon = 1e-6);
    }

    #[test]
    fn test_percentile_normalization() {
        let a = band(Array2::from_shape_fn((1, 101), |(_, j)| j as Sample));
        let n = a.normalize(Normalization::Percentile { percentile: 50.0 });
        assert_relative_eq!(n.data[[0, 25]], 0.5);
        assert_relative_eq!(n.data[[0, 50]], 1.0);
        assert_relative_eq!(n.data[[0, 100]], 1.0);
    }

    #[test]
    fn test_mask_and_inverse() {
        let a = band(array![[1.0, 2.0, 3.0]]);
        let by = band(array![[1.0, 0.0, Sample::NAN]]);

        let masked = a.mask(&by, false).unwrap();
        assert!(masked.data[[0, 0]].is_nan());
        assert_eq!(masked.data[[0, 1]], 2.0);
        assert!(masked.data[[0, 2]].is_nan());

        let inverse = a.mask(&by, true).unwrap();
        assert_eq!(inverse.data[[0, 0]], 1.0);
        assert!(inverse.data[[0, 1]].is_nan());
        // Mask input untouched
        assert_eq!(by.data[[0, 0]], 1.0);
    }

    #[test]
    fn test_statistics_ignore_nan() {
        let a = band(array![[1.0, 2.0], [3.0, Sample::NAN]]);
        assert_relative_eq!(a.median(), 2.0);
        assert_relative_eq!(a.std(), (2.0f64 / 3.0).sqrt(), epsilon = 1e-12);

        let selector = band(array![[0.0, 1.0], [1.0, 1.0]]);
        let stats = a.statistics_where(&selector).unwrap();
        assert_eq!(stats.count, 2);
        assert_relative_eq!(stats.median, 2.5);
    }

    #[test]
    fn test_median_and_moments_of_unsorted_samples() {
        let odd = band(array![[9.0, 1.0, Sample::NAN, 5.0, 3.0, 7.0]]);
        let stats = odd.statistics();
        assert_eq!(stats.count, 5);
        assert_relative_eq!(stats.median, 5.0);
        assert_relative_eq!(stats.mean, 5.0);
        assert_relative_eq!(stats.std, 8.0f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(stats.min, 1.0);
        assert_relative_eq!(stats.max, 9.0);
        assert_relative_eq!(odd.max(), 9.0);
        assert_relative_eq!(odd.std(), stats.std, epsilon = 1e-12);

        let even = band(array![[8.0, 2.0, 6.0, 4.0]]);
        assert_relative_eq!(even.median(), 5.0);
        assert_relative_eq!(
            BandStatistics::from_values(vec![4.0, f64::NAN, 1.0, 3.0, 2.0]).median,
            2.5
        );
    }

    #[test]
    fn test_all_nan_band_statistics() {
        let a = band(Array2::from_elem((2, 2), Sample::NAN));
        assert!(a.max().is_nan());
        assert!(a.std().is_nan());
        assert!(a.median().is_nan());
        assert_eq!(a.statistics().count, 0);
        assert!(a.statistics().min.is_nan());
    }

    #[test]
    fn test_statistics_of_empty_subset_are_nan() {
        let a = band(array![[1.0, 2.0]]);
        let none = band(array![[0.0, 0.0]]);
        let stats = a.statistics_where(&none).unwrap();
        assert_eq!(stats.count, 0);
        assert!(stats.median.is_nan());
        assert!(stats.std.is_nan());
    }
}
