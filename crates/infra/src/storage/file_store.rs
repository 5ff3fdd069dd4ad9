//! JSON file key-value store
//!
//! All keys live in one JSON object on disk. Writes go to a temporary file in
//! the same directory which then replaces the target, so a crash mid-write
//! leaves the previous contents intact.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use ravenfleet_core::KeyValueStore;
use ravenfleet_domain::{FleetError, Result};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::InfraError;

type Entries = BTreeMap<String, String>;

/// File-backed [`KeyValueStore`].
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// The file is created on first write; parent directories must exist or
    /// be creatable.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Entries> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(err) => return Err(InfraError::from(err).into()),
        };
        if contents.trim().is_empty() {
            return Ok(Entries::new());
        }
        serde_json::from_str(&contents).map_err(|e| {
            FleetError::storage(format!("{} is not a valid store file: {e}", self.path.display()))
        })
    }

    fn write_entries(&self, entries: &Entries) -> Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(InfraError::from)?;

        let encoded = serde_json::to_vec_pretty(entries).map_err(InfraError::from)?;
        let mut file = NamedTempFile::new_in(&dir).map_err(InfraError::from)?;
        file.write_all(&encoded).map_err(InfraError::from)?;
        file.as_file().sync_all().map_err(InfraError::from)?;
        file.persist(&self.path).map_err(|e| InfraError::from(e.error))?;

        debug!(path = %self.path.display(), keys = entries.len(), "store file written");
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock();
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.write_entries(&entries)
    }
}
