use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sample type of every raster band
pub type Sample = f32;

/// Coordinate reference system of a band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Crs {
    /// EPSG authority code (e.g. 4326, 32630)
    Epsg(u32),
    /// Well-known-text definition as read from the raster header
    Wkt(String),
    /// No projection information available
    Unknown,
}

impl Crs {
    /// WGS84 geographic coordinates
    pub fn wgs84() -> Self {
        Crs::Epsg(4326)
    }

    /// Build from the projection string GDAL reports for a dataset
    pub fn from_projection(projection: &str) -> Self {
        let trimmed = projection.trim();
        if trimmed.is_empty() {
            return Crs::Unknown;
        }
        if let Some(code) = trimmed
            .strip_prefix("EPSG:")
            .and_then(|c| c.parse::<u32>().ok())
        {
            return Crs::Epsg(code);
        }
        Crs::Wkt(trimmed.to_string())
    }

    /// EPSG code, resolving WKT through GDAL when possible
    pub fn epsg(&self) -> Option<u32> {
        match self {
            Crs::Epsg(code) => Some(*code),
            Crs::Wkt(wkt) => gdal::spatial_ref::SpatialRef::from_wkt(wkt)
                .ok()
                .and_then(|srs| srs.auth_code().ok())
                .and_then(|code| u32::try_from(code).ok()),
            Crs::Unknown => None,
        }
    }

    /// Whether two descriptors name the same system
    pub fn is_equivalent(&self, other: &Crs) -> bool {
        if self == other {
            return true;
        }
        match (self.epsg(), other.epsg()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// GDAL spatial reference with traditional (x = lon/easting, y = lat/northing) axis order
    pub fn to_spatial_ref(&self) -> ShorelineResult<gdal::spatial_ref::SpatialRef> {
        let srs = match self {
            Crs::Epsg(code) => gdal::spatial_ref::SpatialRef::from_epsg(*code)?,
            Crs::Wkt(wkt) => gdal::spatial_ref::SpatialRef::from_wkt(wkt)?,
            Crs::Unknown => {
                return Err(ShorelineError::InvalidParameter(
                    "band has no projection; cannot build a spatial reference".to_string(),
                ))
            }
        };
        srs.set_axis_mapping_strategy(
            gdal_sys::OSRAxisMappingStrategy::OAMS_TRADITIONAL_GIS_ORDER,
        );
        Ok(srs)
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Crs::Epsg(code) => write!(f, "EPSG:{}", code),
            Crs::Wkt(wkt) => write!(f, "WKT({} chars)", wkt.len()),
            Crs::Unknown => write!(f, "unknown CRS"),
        }
    }
}

/// Geospatial transformation parameters (GDAL coefficient order)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub top_left_y: f64,
    pub rotation_y: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// North-up transform without rotation
    pub fn new(top_left_x: f64, top_left_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            top_left_x,
            pixel_width,
            rotation_x: 0.0,
            top_left_y,
            rotation_y: 0.0,
            pixel_height,
        }
    }

    /// From the six coefficients in GDAL order
    pub fn from_gdal(coeffs: [f64; 6]) -> Self {
        Self {
            top_left_x: coeffs[0],
            pixel_width: coeffs[1],
            rotation_x: coeffs[2],
            top_left_y: coeffs[3],
            rotation_y: coeffs[4],
            pixel_height: coeffs[5],
        }
    }

    /// The six coefficients in GDAL order
    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.top_left_x,
            self.pixel_width,
            self.rotation_x,
            self.top_left_y,
            self.rotation_y,
            self.pixel_height,
        ]
    }

    /// World coordinate of the top-left corner of pixel (row, col)
    pub fn pixel_to_world(&self, row: f64, col: f64) -> (f64, f64) {
        let x = self.top_left_x + col * self.pixel_width + row * self.rotation_x;
        let y = self.top_left_y + col * self.rotation_y + row * self.pixel_height;
        (x, y)
    }

    /// Same transform for a grid `factor` times finer
    pub fn refined(&self, factor: usize) -> Self {
        let f = factor as f64;
        Self {
            top_left_x: self.top_left_x,
            pixel_width: self.pixel_width / f,
            rotation_x: self.rotation_x / f,
            top_left_y: self.top_left_y,
            rotation_y: self.rotation_y / f,
            pixel_height: self.pixel_height / f,
        }
    }

    /// World bounding box covered by a grid of `rows` x `cols` pixels
    pub fn bounds(&self, rows: usize, cols: usize) -> BoundingBox {
        let corners = [
            self.pixel_to_world(0.0, 0.0),
            self.pixel_to_world(0.0, cols as f64),
            self.pixel_to_world(rows as f64, 0.0),
            self.pixel_to_world(rows as f64, cols as f64),
        ];
        BoundingBox::enclosing(&corners)
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}

/// Axis-aligned bounding box in world units of some CRS
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Smallest box containing every point
    pub fn enclosing(points: &[(f64, f64)]) -> Self {
        let mut bbox = BoundingBox {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
        };
        for &(x, y) in points {
            bbox.min_x = bbox.min_x.min(x);
            bbox.max_x = bbox.max_x.max(x);
            bbox.min_y = bbox.min_y.min(y);
            bbox.max_y = bbox.max_y.max(y);
        }
        bbox
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Polarity of a binary classification band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassKind {
    Water,
    Land,
}

impl ClassKind {
    /// The other class
    pub fn opposite(self) -> Self {
        match self {
            ClassKind::Water => ClassKind::Land,
            ClassKind::Land => ClassKind::Water,
        }
    }
}

impl std::fmt::Display for ClassKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassKind::Water => write!(f, "water"),
            ClassKind::Land => write!(f, "land"),
        }
    }
}

/// One geo-referenced shoreline vertex in the target CRS
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShorelinePoint {
    /// Longitude (or easting for projected targets)
    pub lon: f64,
    /// Latitude (or northing for projected targets)
    pub lat: f64,
}

/// Acquisition metadata carried into the shoreline CSV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionInfo {
    /// File-name prefix shared by every band of the acquisition
    pub prefix: String,
    /// Platform name, e.g. SENTINEL2A
    pub satellite: Option<String>,
    /// Sensing start time
    pub timestamp: Option<NaiveDateTime>,
    /// Tile / zone identifier, e.g. 30TXR
    pub zone: Option<String>,
}

/// Error types for shoreline extraction
#[derive(Debug, thiserror::Error)]
pub enum ShorelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("Band shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Missing input file: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Acquisition {unit} timed out after {seconds} s")]
    Timeout { unit: String, seconds: u64 },

    #[error("Acquisition {0} was abandoned before writing its outputs")]
    Cancelled(String),

    #[error("Processing error: {0}")]
    Processing(String),
}

/// Result type for shoreline operations
pub type ShorelineResult<T> = Result<T, ShorelineError>;
