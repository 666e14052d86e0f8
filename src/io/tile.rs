use crate::core::band::RasterBand;
use crate::core::synthesis::SynthesisInputs;
use crate::io::raster::read_band;
use crate::types::{AcquisitionInfo, ShorelineError, ShorelineResult};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the mask sub-folder of a product directory
pub const MASKS_DIR: &str = "MASKS";

/// File-name codes of the bands and masks used by the pipeline
///
/// Defaults follow the Sentinel-2 L2A flat-reflectance layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandCodes {
    pub blue: String,
    pub green: String,
    pub red: String,
    pub swir: String,
    /// Cloud mask on the visible-band grid (10 m)
    pub cloud_fine: String,
    /// Cloud mask on the SWIR grid (20 m)
    pub cloud_coarse: String,
    pub edge_fine: String,
    pub edge_coarse: String,
}

impl Default for BandCodes {
    fn default() -> Self {
        Self {
            blue: "FRE_B2".to_string(),
            green: "FRE_B3".to_string(),
            red: "FRE_B4".to_string(),
            swir: "FRE_B11".to_string(),
            cloud_fine: "CLM_R1".to_string(),
            cloud_coarse: "CLM_R2".to_string(),
            edge_fine: "EDG_R1".to_string(),
            edge_coarse: "EDG_R2".to_string(),
        }
    }
}

impl AcquisitionInfo {
    /// Parse `SENTINEL2A_20180904-105817-066_L2A_T30TXR_C_V2-2`-style prefixes
    ///
    /// Unrecognised prefixes keep only the raw prefix.
    pub fn from_prefix(prefix: &str) -> Self {
        let mut info = AcquisitionInfo {
            prefix: prefix.to_string(),
            satellite: None,
            timestamp: None,
            zone: None,
        };

        if let Ok(re) = regex::Regex::new(r"^(SENTINEL2[A-D])_(\d{8}-\d{6})-\d{3}_L2A_T(\w{5})_") {
            if let Some(caps) = re.captures(prefix) {
                info.satellite = caps.get(1).map(|m| m.as_str().to_string());
                info.timestamp = caps
                    .get(2)
                    .and_then(|m| NaiveDateTime::parse_from_str(m.as_str(), "%Y%m%d-%H%M%S").ok());
                info.zone = caps.get(3).map(|m| m.as_str().to_string());
            }
        }

        if info.timestamp.is_none() {
            log::debug!("Prefix {} does not carry acquisition metadata", prefix);
        }
        info
    }

    /// `YYYYMMDD` of the acquisition, if known
    pub fn date(&self) -> Option<String> {
        self.timestamp.map(|t| t.format("%Y%m%d").to_string())
    }
}

/// All rasters of one acquisition, read from disk
#[derive(Debug, Clone)]
pub struct TileBands {
    pub red: RasterBand,
    pub green: RasterBand,
    pub blue: RasterBand,
    pub swir: RasterBand,
    pub cloud_mask_fine: RasterBand,
    pub cloud_mask_coarse: RasterBand,
    pub edge_mask_fine: Option<RasterBand>,
    pub edge_mask_coarse: Option<RasterBand>,
}

impl TileBands {
    /// Borrow the bands as pipeline inputs
    pub fn inputs(&self) -> SynthesisInputs<'_> {
        SynthesisInputs {
            red: &self.red,
            green: &self.green,
            blue: &self.blue,
            swir: &self.swir,
            cloud_mask_fine: &self.cloud_mask_fine,
            cloud_mask_coarse: &self.cloud_mask_coarse,
            edge_mask_fine: self.edge_mask_fine.as_ref(),
            edge_mask_coarse: self.edge_mask_coarse.as_ref(),
        }
    }
}

/// One acquisition over one tile: `<dir>/<prefix>_<CODE>.tif` plus `<dir>/MASKS/`
#[derive(Debug, Clone)]
pub struct TileProduct {
    dir: PathBuf,
    prefix: String,
    codes: BandCodes,
}

impl TileProduct {
    /// Product in `dir` whose files start with `prefix`
    pub fn new<P: AsRef<Path>>(dir: P, prefix: &str, codes: BandCodes) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            prefix: prefix.to_string(),
            codes,
        }
    }

    /// Locate the product prefix from the red-band file of a directory
    pub fn discover<P: AsRef<Path>>(dir: P, codes: BandCodes) -> ShorelineResult<Self> {
        let dir = dir.as_ref();
        let suffix = format!("_{}.tif", codes.red);
        let mut prefixes: Vec<String> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter_map(|name| name.strip_suffix(&suffix).map(str::to_string))
            .collect();
        prefixes.sort();

        match prefixes.len() {
            0 => Err(ShorelineError::MissingInput(dir.join(format!("*{}", suffix)))),
            1 => Ok(Self::new(dir, &prefixes[0], codes)),
            n => Err(ShorelineError::InvalidFormat(format!(
                "{} holds {} products ({}); expected one",
                dir.display(),
                n,
                prefixes.join(", ")
            ))),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn codes(&self) -> &BandCodes {
        &self.codes
    }

    /// Satellite, time and zone parsed from the prefix
    pub fn info(&self) -> AcquisitionInfo {
        AcquisitionInfo::from_prefix(&self.prefix)
    }

    /// Path of the `<prefix>_<code>.tif` band file
    pub fn band_path(&self, code: &str) -> PathBuf {
        self.dir.join(format!("{}_{}.tif", self.prefix, code))
    }

    /// Path of a mask file under `MASKS/`
    pub fn mask_path(&self, code: &str) -> PathBuf {
        self.dir
            .join(MASKS_DIR)
            .join(format!("{}_{}.tif", self.prefix, code))
    }

    /// Paths that must exist for the acquisition to be processed
    pub fn required_paths(&self, with_edge_masks: bool) -> Vec<PathBuf> {
        let c = &self.codes;
        let mut paths = vec![
            self.band_path(&c.red),
            self.band_path(&c.green),
            self.band_path(&c.blue),
            self.band_path(&c.swir),
            self.mask_path(&c.cloud_fine),
            self.mask_path(&c.cloud_coarse),
        ];
        if with_edge_masks {
            paths.push(self.mask_path(&c.edge_fine));
            paths.push(self.mask_path(&c.edge_coarse));
        }
        paths
    }

    /// Read every band and mask; the first missing file aborts the load
    pub fn load(&self, with_edge_masks: bool) -> ShorelineResult<TileBands> {
        if let Some(missing) = self
            .required_paths(with_edge_masks)
            .into_iter()
            .find(|p| !p.exists())
        {
            return Err(ShorelineError::MissingInput(missing));
        }
        log::info!("Loading acquisition {}", self.prefix);

        let c = &self.codes;
        let (edge_mask_fine, edge_mask_coarse) = if with_edge_masks {
            (
                Some(read_band(self.mask_path(&c.edge_fine))?),
                Some(read_band(self.mask_path(&c.edge_coarse))?),
            )
        } else {
            (None, None)
        };

        Ok(TileBands {
            red: read_band(self.band_path(&c.red))?,
            green: read_band(self.band_path(&c.green))?,
            blue: read_band(self.band_path(&c.blue))?,
            swir: read_band(self.band_path(&c.swir))?,
            cloud_mask_fine: read_band(self.mask_path(&c.cloud_fine))?,
            cloud_mask_coarse: read_band(self.mask_path(&c.cloud_coarse))?,
            edge_mask_fine,
            edge_mask_coarse,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use tempfile::TempDir;

    const PREFIX: &str = "SENTINEL2A_20180904-105817-066_L2A_T30TXR_C_V2-2";

    #[test]
    fn test_parse_theia_prefix() {
        let info = AcquisitionInfo::from_prefix(PREFIX);
        assert_eq!(info.satellite.as_deref(), Some("SENTINEL2A"));
        assert_eq!(info.zone.as_deref(), Some("30TXR"));
        let ts = info.timestamp.unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2018, 9, 4));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (10, 58, 17));
        assert_eq!(info.date().as_deref(), Some("20180904"));
    }

    #[test]
    fn test_unrecognised_prefix_keeps_raw_name() {
        let info = AcquisitionInfo::from_prefix("my_scene");
        assert_eq!(info.prefix, "my_scene");
        assert!(info.satellite.is_none());
        assert!(info.timestamp.is_none());
        assert!(info.zone.is_none());
    }

    #[test]
    fn test_paths_follow_naming_convention() {
        let tile = TileProduct::new("/data/30TXR", PREFIX, BandCodes::default());
        assert_eq!(
            tile.band_path("FRE_B4"),
            PathBuf::from(format!("/data/30TXR/{}_FRE_B4.tif", PREFIX))
        );
        assert_eq!(
            tile.mask_path("CLM_R2"),
            PathBuf::from(format!("/data/30TXR/MASKS/{}_CLM_R2.tif", PREFIX))
        );
        assert_eq!(tile.required_paths(false).len(), 6);
        assert_eq!(tile.required_paths(true).len(), 8);
    }

    #[test]
    fn test_missing_mask_aborts_load() {
        let dir = TempDir::new().unwrap();
        let tile = TileProduct::new(dir.path(), PREFIX, BandCodes::default());
        match tile.load(false) {
            Err(ShorelineError::MissingInput(path)) => {
                assert!(path.ends_with(format!("{}_FRE_B4.tif", PREFIX)))
            }
            other => panic!("expected MissingInput, got {:?}", other),
        }
    }

    #[test]
    fn test_discover_prefix() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(format!("{}_FRE_B4.tif", PREFIX)), b"").unwrap();
        std::fs::write(dir.path().join(format!("{}_FRE_B3.tif", PREFIX)), b"").unwrap();

        let tile = TileProduct::discover(dir.path(), BandCodes::default()).unwrap();
        assert_eq!(tile.prefix(), PREFIX);

        let empty = TempDir::new().unwrap();
        assert!(TileProduct::discover(empty.path(), BandCodes::default()).is_err());
    }
}
