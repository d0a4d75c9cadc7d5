//! Data file formats for decoded recordings
//!
//! A data file holds the `(recordings, additional_data)` pair produced by a
//! converter. The format is chosen from the file extension; every reader goes
//! through [`Recording`] validation, so a loaded file is always consistent.

use crate::recording::Recording;
use crate::types::{GazeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod json;

pub use json::JsonFormat;

/// Contents of one data file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GazeDataFile {
    pub recordings: Vec<Recording>,
    /// Opaque payload stored alongside the recordings (experiment parameters etc.)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_data: Option<serde_json::Value>,
}

impl GazeDataFile {
    pub fn new(recordings: Vec<Recording>) -> Self {
        Self {
            recordings,
            additional_data: None,
        }
    }

    /// Builder method: attach an opaque payload
    pub fn with_additional_data(mut self, data: serde_json::Value) -> Self {
        self.additional_data = Some(data);
        self
    }

    pub fn recording(&self, index: usize) -> Result<&Recording> {
        self.recordings.get(index).ok_or_else(|| {
            GazeError::InvalidArgument(format!(
                "Recording index {} out of range ({} recordings)",
                index,
                self.recordings.len()
            ))
        })
    }
}

/// Common interface of all data file formats
pub trait DataFileFormat {
    fn read(path: &Path) -> Result<GazeDataFile>;

    fn write(path: &Path, data: &GazeDataFile) -> Result<()>;
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
}

/// Load a data file, selecting the format from its extension
pub fn load_file(path: &Path) -> Result<GazeDataFile> {
    log::info!("Loading data file: {:?}", path);

    let data = match extension_of(path).as_deref() {
        Some("json") => {
            log::debug!("Detected JSON data file");
            JsonFormat::read(path)?
        }
        other => {
            return Err(GazeError::LoadError(format!(
                "Unsupported file format: {:?}",
                other
            )))
        }
    };

    log::info!(
        "Loaded {} recordings from {:?}",
        data.recordings.len(),
        path
    );
    Ok(data)
}

/// Save a data file, selecting the format from its extension
pub fn save_file(path: &Path, data: &GazeDataFile) -> Result<()> {
    match extension_of(path).as_deref() {
        Some("json") => JsonFormat::write(path, data)?,
        other => {
            return Err(GazeError::LoadError(format!(
                "Unsupported file format: {:?}",
                other
            )))
        }
    }
    log::info!("Saved {} recordings to {:?}", data.recordings.len(), path);
    Ok(())
}
