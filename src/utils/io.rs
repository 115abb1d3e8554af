//! Artifact persistence
//!
//! Fitted objects are stored with bincode, metrics and indexes as pretty JSON.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

use crate::error::{HousingError, Result};

/// Serialize a fitted object to `path`, creating parent directories
pub fn save_artifact<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(create_with_parents(path)?);
    bincode::serialize_into(&mut writer, value)?;
    writer.flush()?;
    debug!(path = %path.display(), "Saved artifact");
    Ok(())
}

/// Deserialize a fitted object; [`HousingError::ArtifactMissing`] if the file does not exist
pub fn load_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = open_existing(path)?;
    let value = bincode::deserialize_from(BufReader::new(file))?;
    debug!(path = %path.display(), "Loaded artifact");
    Ok(value)
}

/// Write pretty-printed JSON to `path`, creating parent directories
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(create_with_parents(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// Read JSON from `path`; [`HousingError::ArtifactMissing`] if the file does not exist
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = open_existing(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn create_with_parents(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}

fn open_existing(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => HousingError::ArtifactMissing(path.to_path_buf()),
        _ => HousingError::IoError(e),
    })
}
