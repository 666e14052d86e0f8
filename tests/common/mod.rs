//! Synthetic Sentinel-2-like acquisition: sea on the left half, land on the right
#![allow(dead_code)]

use ndarray::Array2;
use shoreline::io::tile::TileBands;
use shoreline::{Crs, GeoTransform, RasterBand, Sample};

pub const SIZE: usize = 40;
pub const COAST_COL: usize = 20;
pub const ORIGIN_X: f64 = 600_000.0;
pub const ORIGIN_Y: f64 = 4_800_000.0;
pub const EPSG: u32 = 32630;
pub const PREFIX: &str = "SENTINEL2A_20180904-105817-066_L2A_T30TXR_C_V2-2";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn fine(data: Array2<Sample>) -> RasterBand {
    RasterBand::new(
        data,
        GeoTransform::new(ORIGIN_X, ORIGIN_Y, 10.0, -10.0),
        Crs::Epsg(EPSG),
    )
}

fn coarse(data: Array2<Sample>) -> RasterBand {
    RasterBand::new(
        data,
        GeoTransform::new(ORIGIN_X, ORIGIN_Y, 20.0, -20.0),
        Crs::Epsg(EPSG),
    )
}

/// Reflectance with two alternating looks per class
fn visible(sea: [Sample; 2], land: [Sample; 2]) -> RasterBand {
    fine(Array2::from_shape_fn((SIZE, SIZE), |(i, j)| {
        let look = (i + j) % 2;
        if j < COAST_COL {
            sea[look]
        } else {
            land[look]
        }
    }))
}

/// SWIR is dark over water and bright over land
fn swir() -> RasterBand {
    let half = SIZE / 2;
    coarse(Array2::from_shape_fn((half, half), |(i, j)| {
        let look = (i + j) % 2;
        if j < COAST_COL / 2 {
            [100.0, 200.0][look]
        } else {
            [900.0, 1000.0][look]
        }
    }))
}

/// Scene with one clouded 20 m pixel out at sea
pub fn scene() -> TileBands {
    let half = SIZE / 2;
    let mut cloud_coarse = Array2::<Sample>::zeros((half, half));
    cloud_coarse[[10, 4]] = 1.0;
    let mut cloud_fine = Array2::<Sample>::zeros((SIZE, SIZE));
    for i in 20..22 {
        for j in 8..10 {
            cloud_fine[[i, j]] = 3.0;
        }
    }

    TileBands {
        red: visible([0.0, 0.0], [1000.0, 900.0]),
        green: visible([0.0, 100.0], [1000.0, 800.0]),
        blue: visible([1000.0, 800.0], [0.0, 100.0]),
        swir: swir(),
        cloud_mask_fine: fine(cloud_fine),
        cloud_mask_coarse: coarse(cloud_coarse),
        edge_mask_fine: None,
        edge_mask_coarse: None,
    }
}

/// Same scene with a featureless SWIR band
pub fn flat_swir_scene() -> TileBands {
    let mut bands = scene();
    bands.swir = coarse(Array2::from_elem((SIZE / 2, SIZE / 2), 500.0));
    bands
}
