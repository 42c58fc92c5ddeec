//! JSON-file backed [`KeyValueStore`].
//!
//! The whole store is one flat JSON object. Every write rewrites the file,
//! which is fine for the handful of flags kept here.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use homepro_core::error::CoreError;
use homepro_core::intro::KeyValueStore;

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, CoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(CoreError::Storage(format!(
                    "Failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };

        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&raw).map_err(|e| {
            CoreError::Storage(format!("Corrupt state file {}: {e}", self.path.display()))
        })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());

        let json = serde_json::to_string_pretty(&values)
            .map_err(|e| CoreError::Storage(format!("Failed to encode state: {e}")))?;
        std::fs::write(&self.path, json).map_err(|e| {
            CoreError::Storage(format!("Failed to write {}: {e}", self.path.display()))
        })?;

        tracing::debug!(path = %self.path.display(), key, "State file updated");
        Ok(())
    }
}
