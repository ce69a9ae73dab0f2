//! Persisted mapping-session state: one status per brand plus the cursor.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::catalog::atomic_write_json;
use crate::types::AppResult;

/// Lifecycle of one brand within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrandStatus {
    Pending,
    Confirmed,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandSession {
    pub brand_name: String,
    pub status: BrandStatus,
    /// Entry paths whose `mapped_name` this session wrote; exactly these
    /// are cleared again by undo.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub applied_mapping_ids: BTreeSet<String>,
}

impl BrandSession {
    pub fn new(brand_name: impl Into<String>) -> Self {
        Self {
            brand_name: brand_name.into(),
            status: BrandStatus::Pending,
            applied_mapping_ids: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressState {
    pub brand_order: Vec<String>,
    pub cursor: usize,
    pub sessions: BTreeMap<String, BrandSession>,
    pub updated_at: DateTime<Utc>,
}

impl ProgressState {
    pub fn new(brand_order: Vec<String>) -> Self {
        let sessions = brand_order
            .iter()
            .map(|name| (name.clone(), BrandSession::new(name.clone())))
            .collect();
        Self {
            brand_order,
            cursor: 0,
            sessions,
            updated_at: Utc::now(),
        }
    }

    pub fn position_of(&self, brand: &str) -> Option<usize> {
        self.brand_order.iter().position(|name| name == brand)
    }

    /// First brand at or after the cursor still waiting to be processed.
    pub fn next_pending(&self) -> Option<&str> {
        self.brand_order
            .iter()
            .skip(self.cursor)
            .find(|name| {
                self.sessions
                    .get(name.as_str())
                    .map_or(true, |session| session.status == BrandStatus::Pending)
            })
            .map(String::as_str)
    }

    /// Number of brands already confirmed or skipped.
    pub fn processed(&self) -> usize {
        self.sessions
            .values()
            .filter(|session| session.status != BrandStatus::Pending)
            .count()
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.brand_order.len()
    }
}

/// Storage seam for the progress document.
pub trait ProgressStorage {
    /// `Ok(None)` when no progress has been persisted yet.
    fn load(&self) -> AppResult<Option<ProgressState>>;
    fn save(&self, state: &ProgressState) -> AppResult<()>;
    fn delete(&self) -> AppResult<()>;
}

pub struct JsonProgressStorage {
    path: PathBuf,
}

impl JsonProgressStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressStorage for JsonProgressStorage {
    fn load(&self) -> AppResult<Option<ProgressState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        let state: ProgressState = serde_json::from_str(&raw)?;
        Ok(Some(state))
    }

    fn save(&self, state: &ProgressState) -> AppResult<()> {
        atomic_write_json(&self.path, state)
    }

    fn delete(&self) -> AppResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/progress_tests.rs"]
mod tests;
