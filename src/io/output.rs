use crate::types::{AcquisitionInfo, ShorelinePoint, ShorelineResult};
use std::path::{Path, PathBuf};

/// Output directory of one acquisition: `<root>/<zone>/<date>/`
#[derive(Debug, Clone, PartialEq)]
pub struct OutputLayout {
    dir: PathBuf,
    prefix: String,
}

impl OutputLayout {
    /// Layout for explicit zone and date directory names
    pub fn new<P: AsRef<Path>>(root: P, zone: &str, date: &str, prefix: &str) -> Self {
        Self {
            dir: root.as_ref().join(zone).join(date),
            prefix: prefix.to_string(),
        }
    }

    /// Layout for an acquisition; unknown zone or date fall back to `unknown`
    pub fn for_acquisition<P: AsRef<Path>>(root: P, info: &AcquisitionInfo) -> Self {
        let zone = info.zone.as_deref().unwrap_or("unknown");
        let date = info.date().unwrap_or_else(|| "unknown".to_string());
        Self::new(root, zone, &date, &info.prefix)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory tree; safe when another worker already did
    pub fn ensure(&self) -> ShorelineResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Path of the shoreline point file
    pub fn shoreline_csv(&self) -> PathBuf {
        self.dir.join(format!("{}_shoreline.csv", self.prefix))
    }

    /// Path of the cleaned water map
    pub fn water_tif(&self) -> PathBuf {
        self.dir.join(format!("{}_water.tif", self.prefix))
    }

    /// Path of the boundary map
    pub fn boundary_tif(&self) -> PathBuf {
        self.dir.join(format!("{}_boundary.tif", self.prefix))
    }
}

/// Write shoreline points as header-less `lon,lat` rows
///
/// With `meta`, each row is prefixed with `timestamp,satellite,zone`.
pub fn write_shoreline_csv<P: AsRef<Path>>(
    path: P,
    points: &[ShorelinePoint],
    meta: Option<&AcquisitionInfo>,
) -> ShorelineResult<()> {
    let path = path.as_ref();
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    let prefix: Option<[String; 3]> = meta.map(|info| {
        [
            info.timestamp
                .map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string())
                .unwrap_or_default(),
            info.satellite.clone().unwrap_or_default(),
            info.zone.clone().unwrap_or_default(),
        ]
    });

    for point in points {
        let lon = point.lon.to_string();
        let lat = point.lat.to_string();
        match &prefix {
            Some([timestamp, satellite, zone]) => {
                writer.write_record([
                    timestamp.as_str(),
                    satellite.as_str(),
                    zone.as_str(),
                    lon.as_str(),
                    lat.as_str(),
                ])?
            }
            None => writer.write_record([lon.as_str(), lat.as_str()])?,
        }
    }
    writer.flush()?;

    log::info!("Wrote {} shoreline points to {}", points.len(), path.display());
    Ok(())
}
