//! Connected-component labeling and size-based blob retention

use crate::core::band::{truthy, RasterBand};
use crate::types::Sample;
use ndarray::Array2;

/// Result of labeling a binary grid under 4-connectivity
#[derive(Debug, Clone)]
pub struct ComponentLabels {
    /// 0 for background, 1..=count for components
    pub labels: Array2<u32>,
    /// Pixel count per label; index 0 is the background
    pub sizes: Vec<usize>,
}

impl ComponentLabels {
    /// Number of components, background excluded
    pub fn count(&self) -> usize {
        self.sizes.len() - 1
    }
}

fn find_root(parent: &mut [u32], mut x: u32) -> u32 {
    while parent[x as usize] != x {
        parent[x as usize] = parent[parent[x as usize] as usize];
        x = parent[x as usize];
    }
    x
}

fn merge(parent: &mut [u32], a: u32, b: u32) {
    let ra = find_root(parent, a);
    let rb = find_root(parent, b);
    if ra < rb {
        parent[rb as usize] = ra;
    } else if rb < ra {
        parent[ra as usize] = rb;
    }
}

/// Two-pass union-find labeling of the `true` pixels, 4-connected
pub fn label_components(foreground: &Array2<bool>) -> ComponentLabels {
    let (rows, cols) = foreground.dim();
    let mut labels = Array2::<u32>::zeros((rows, cols));
    let mut parent: Vec<u32> = vec![0];

    for i in 0..rows {
        for j in 0..cols {
            if !foreground[[i, j]] {
                continue;
            }
            let up = if i > 0 { labels[[i - 1, j]] } else { 0 };
            let left = if j > 0 { labels[[i, j - 1]] } else { 0 };

            labels[[i, j]] = match (up, left) {
                (0, 0) => {
                    let next = parent.len() as u32;
                    parent.push(next);
                    next
                }
                (l, 0) | (0, l) => l,
                (u, l) => {
                    merge(&mut parent, u, l);
                    u.min(l)
                }
            };
        }
    }

    // Compact roots to sequential labels
    let mut compact = vec![0u32; parent.len()];
    let mut sizes = vec![0usize];
    for label in labels.iter_mut() {
        if *label == 0 {
            sizes[0] += 1;
            continue;
        }
        let root = find_root(&mut parent, *label) as usize;
        if compact[root] == 0 {
            compact[root] = sizes.len() as u32;
            sizes.push(0);
        }
        *label = compact[root];
        sizes[*label as usize] += 1;
    }

    ComponentLabels { labels, sizes }
}

impl RasterBand {
    /// Keep connected components of at least `npixel` pixels
    ///
    /// With `background == false` the non-zero pixels are labeled and large
    /// components are written as `fillvalue` into a zero grid. With
    /// `background == true` the complement `max(data) - data` is labeled
    /// instead and large components are written as `fillvalue` into a grid of
    /// ones. NaN pixels are never labeled and stay NaN.
    pub fn clean(&self, npixel: usize, fillvalue: Sample, background: bool) -> RasterBand {
        let foreground = if background {
            let peak = self.max() as Sample;
            self.data.mapv(|v| truthy(peak - v))
        } else {
            self.data.mapv(truthy)
        };

        let components = label_components(&foreground);
        let base: Sample = if background { 1.0 } else { 0.0 };
        let kept = components.sizes[1..]
            .iter()
            .filter(|&&size| size >= npixel)
            .count();
        log::debug!(
            "clean(npixel={}, background={}): {} of {} components retained",
            npixel,
            background,
            kept,
            components.count()
        );

        let mut data = Array2::from_elem(self.shape(), base);
        for ((idx, &label), &value) in components.labels.indexed_iter().zip(self.data.iter()) {
            if value.is_nan() {
                data[idx] = Sample::NAN;
            } else if label != 0 && components.sizes[label as usize] >= npixel {
                data[idx] = fillvalue;
            }
        }
        self.with_data(data)
    }
}
