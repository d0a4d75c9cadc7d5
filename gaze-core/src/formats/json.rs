//! JSON data files
//!
//! The whole `(recordings, additional_data)` pair is one JSON document. Text is
//! written as UTF-8, so message payloads round-trip unchanged.

use super::{DataFileFormat, GazeDataFile};
use crate::types::{GazeError, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

pub struct JsonFormat;

impl DataFileFormat for JsonFormat {
    fn read(path: &Path) -> Result<GazeDataFile> {
        if !path.exists() {
            return Err(GazeError::LoadError(format!(
                "Data file not found: {:?}",
                path
            )));
        }

        let reader = BufReader::new(File::open(path)?);
        let data: GazeDataFile = serde_json::from_reader(reader).map_err(|e| {
            GazeError::LoadError(format!("Failed to parse {:?}: {}", path, e))
        })?;

        for (i, recording) in data.recordings.iter().enumerate() {
            log::debug!(
                "Recording {}: {} saccades, {} fixations, {} messages, {} samples",
                i,
                recording.n_sac(),
                recording.n_fix(),
                recording.n_msg(),
                recording.samples().len()
            );
        }

        Ok(data)
    }

    fn write(path: &Path, data: &GazeDataFile) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, data)?;
        writer.flush()?;
        Ok(())
    }
}
