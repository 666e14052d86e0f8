//! Raster and vector file access

pub mod output;
pub mod raster;
pub mod tile;

pub use output::{write_shoreline_csv, OutputLayout};
pub use raster::{read_band, write_geotiff, RasterDataType};
pub use tile::{BandCodes, TileBands, TileProduct};
