//! JSON file persistence for catalogs.
//!
//! Writes go through a temp file in the destination directory followed by
//! an atomic rename, so an interrupted save leaves the previous file intact.

use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::types::{AppError, AppResult};

use super::model::Catalog;

/// Storage seam for a catalog document.
pub trait CatalogStorage {
    fn load(&self) -> AppResult<Catalog>;
    fn save(&self, catalog: &Catalog) -> AppResult<()>;
}

pub struct JsonCatalogStorage {
    path: PathBuf,
}

impl JsonCatalogStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogStorage for JsonCatalogStorage {
    fn load(&self) -> AppResult<Catalog> {
        if !self.path.exists() {
            return Err(AppError::NotFound(format!(
                "Catalog file not found: {}",
                self.path.display()
            )));
        }
        let raw = fs::read_to_string(&self.path)?;
        let mut catalog: Catalog = serde_json::from_str(&raw)?;
        catalog.normalize_ids();
        Ok(catalog)
    }

    fn save(&self, catalog: &Catalog) -> AppResult<()> {
        // Persist with fresh counters so metadata never drifts from the tree.
        let mut doc = catalog.clone();
        doc.refresh_metadata();
        atomic_write_json(&self.path, &doc)
    }
}

/// Serialize `value` as pretty JSON and atomically replace `path` with it.
pub fn atomic_write_json<T: Serialize>(path: &Path, value: &T) -> AppResult<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let json = serde_json::to_string_pretty(value)?;
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(json.as_bytes())?;
    tmp.persist(path).map_err(|e| AppError::Io(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/storage_tests.rs"]
mod tests;
