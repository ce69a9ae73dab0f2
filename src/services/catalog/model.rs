//! Catalog tree model: brand, model and submodel entries for one market.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use chrono::{DateTime, Utc};

/// Compiled regex for collapsing duplicate hyphens in slugs.
static RE_MULTI_HYPHEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-{2,}").expect("Invalid regex"));

/// Hierarchy level of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Brand,
    Model,
    Submodel,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Brand => write!(f, "brand"),
            Level::Model => write!(f, "model"),
            Level::Submodel => write!(f, "submodel"),
        }
    }
}

/// One node of the catalog tree.
///
/// `mapped_name` holds the confirmed counterpart name from the other
/// market's catalog; absent until a mapping is applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default)]
    pub source_id: String,
    pub level: Level,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CatalogEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped_name: Option<String>,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, level: Level) -> Self {
        let name = name.into();
        let source_id = slug(&name);
        Self {
            name,
            source_id,
            level,
            children: Vec::new(),
            mapped_name: None,
        }
    }

    pub fn is_mapped(&self) -> bool {
        self.mapped_name.is_some()
    }

    pub fn child_by_name(&self, name: &str) -> Option<&CatalogEntry> {
        self.children.iter().find(|child| child.name == name)
    }

    fn child_by_id_mut(&mut self, source_id: &str) -> Option<&mut CatalogEntry> {
        self.children
            .iter_mut()
            .find(|child| child.source_id == source_id)
    }

    fn child_by_id(&self, source_id: &str) -> Option<&CatalogEntry> {
        self.children
            .iter()
            .find(|child| child.source_id == source_id)
    }

    /// Fill in empty `source_id`s (own and descendants) with name-derived slugs.
    fn fill_missing_ids(&mut self) {
        if self.source_id.is_empty() {
            self.source_id = slug(&self.name);
        }
        for child in &mut self.children {
            child.fill_missing_ids();
        }
    }
}

/// URL-friendly slug for an entry name, matching the sites' value format.
pub fn slug(name: &str) -> String {
    let latin = deunicode::deunicode(name);
    let mut value = latin.to_lowercase();
    value = value.replace(' ', "-");
    value = value.replace(['(', ')', '.'], "");
    value = value.replace('/', "-");
    value = value.replace('+', "plus");
    RE_MULTI_HYPHEN
        .replace_all(&value, "-")
        .trim_matches('-')
        .to_string()
}

/// Slash-joined entry id path (`"bmw/serie-1/120d"`).
pub fn entry_path(prefix: &str, source_id: &str) -> String {
    if prefix.is_empty() {
        source_id.to_string()
    } else {
        format!("{prefix}/{source_id}")
    }
}

/// Summary counters persisted alongside the catalog tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market: Option<String>,
    #[serde(default)]
    pub total_brands: usize,
    #[serde(default)]
    pub total_models: usize,
    #[serde(default)]
    pub total_submodels: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A full brand catalog for one market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub metadata: CatalogMetadata,
    pub brands: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(brands: Vec<CatalogEntry>) -> Self {
        let mut catalog = Self {
            metadata: CatalogMetadata::default(),
            brands,
        };
        catalog.normalize_ids();
        catalog.refresh_metadata();
        catalog
    }

    pub fn brand(&self, name: &str) -> Option<&CatalogEntry> {
        self.brands.iter().find(|brand| brand.name == name)
    }

    /// Resolve an entry by its slash-joined id path.
    pub fn entry_by_path(&self, path: &str) -> Option<&CatalogEntry> {
        let mut segments = path.split('/');
        let brand_id = segments.next()?;
        let mut entry = self
            .brands
            .iter()
            .find(|brand| brand.source_id == brand_id)?;
        for segment in segments {
            entry = entry.child_by_id(segment)?;
        }
        Some(entry)
    }

    pub fn entry_by_path_mut(&mut self, path: &str) -> Option<&mut CatalogEntry> {
        let mut segments = path.split('/');
        let brand_id = segments.next()?;
        let mut entry = self
            .brands
            .iter_mut()
            .find(|brand| brand.source_id == brand_id)?;
        for segment in segments {
            entry = entry.child_by_id_mut(segment)?;
        }
        Some(entry)
    }

    /// Write `mapped_name` onto the entry at `path`.
    ///
    /// Returns false without touching the entry when the path does not
    /// resolve or the entry already carries a mapping; commit keeps the
    /// remaining candidates either way.
    pub fn apply_mapping(&mut self, path: &str, target_name: &str) -> bool {
        let Some(entry) = self.entry_by_path_mut(path) else {
            log::warn!("Mapping rejected, no entry at path {path}");
            return false;
        };
        if let Some(existing) = &entry.mapped_name {
            log::warn!("Mapping rejected, {path} is already mapped to {existing}");
            return false;
        }
        entry.mapped_name = Some(target_name.to_string());
        true
    }

    /// Remove the mapping at `path`. Returns true when one was present.
    pub fn clear_mapping(&mut self, path: &str) -> bool {
        match self.entry_by_path_mut(path) {
            Some(entry) => entry.mapped_name.take().is_some(),
            None => false,
        }
    }

    /// Recompute the metadata counters from the tree.
    pub fn refresh_metadata(&mut self) {
        let mut models = 0;
        let mut submodels = 0;
        for brand in &self.brands {
            models += brand.children.len();
            for model in &brand.children {
                submodels += model.children.len();
            }
        }
        self.metadata.total_brands = self.brands.len();
        self.metadata.total_models = models;
        self.metadata.total_submodels = submodels;
        self.metadata.updated_at = Some(Utc::now());
    }

    /// Derive slugs for entries that were loaded without a `source_id`.
    pub fn normalize_ids(&mut self) {
        for brand in &mut self.brands {
            brand.fill_missing_ids();
        }
    }
}

#[cfg(test)]
#[path = "tests/model_tests.rs"]
mod tests;
