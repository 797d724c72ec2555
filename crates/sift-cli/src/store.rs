//! JSON file store for the app data
//!
//! The core treats persistence as an external collaborator; this is that
//! collaborator. One JSON file holds the whole `AppData` aggregate. Writes
//! go through a temp file in the same directory followed by an atomic
//! rename, so a crash mid-save never corrupts existing data.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use sift_core::AppData;

pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Platform data directory default, e.g. ~/.local/share/sift/data.json
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::data_dir().context("could not determine platform data directory")?;
        Ok(base.join("sift").join("data.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the aggregate; a missing file yields empty data
    pub fn load(&self) -> Result<AppData> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no data file yet, starting empty");
            return Ok(AppData::default());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", self.path.display()))
    }

    /// Save the aggregate atomically
    pub fn save(&self, data: &AppData) -> Result<()> {
        let dir = self
            .path
            .parent()
            .context("data path has no parent directory")?;
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

        let tmp = tempfile::NamedTempFile::new_in(dir).context("creating temp data file")?;
        serde_json::to_writer_pretty(&tmp, data).context("serializing data")?;
        tmp.persist(&self.path)
            .with_context(|| format!("writing {}", self.path.display()))?;

        debug!(path = %self.path.display(), "data saved");
        Ok(())
    }
}
