//! File-backed theme store.
//!
//! Keys live in one small RON map on disk. A missing file reads as empty;
//! every write rewrites the whole map.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use aether_sky::{StoreError, ThemeStore};
use tracing::debug;

/// [`ThemeStore`] persisted as a RON map.
#[derive(Debug, Clone)]
pub struct FileThemeStore {
    path: PathBuf,
}

impl FileThemeStore {
    /// Store backed by the file at `path`. Nothing is touched until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        ron::from_str(&contents)
            .map_err(|e| StoreError::from(io::Error::new(io::ErrorKind::InvalidData, e)))
    }
}

impl ThemeStore for FileThemeStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_map()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self.read_map().unwrap_or_default();
        map.insert(key.to_string(), value.to_string());
        let contents = ron::ser::to_string_pretty(&map, ron::ser::PrettyConfig::default())
            .map_err(io::Error::other)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, contents)?;
        debug!("Stored {key}={value} in {}", self.path.display());
        Ok(())
    }
}
