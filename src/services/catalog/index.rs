//! Reverse mapping index: target name -> annotated source entries.
//!
//! Lets downstream lookups resolve a foreign-market name straight to the
//! local brand/model it was mapped onto.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::model::{entry_path, Catalog, Level};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRecord {
    pub brand: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submodel: Option<String>,
    pub level: Level,
    pub entry_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReverseIndex {
    pub generated_at: DateTime<Utc>,
    pub total_mappings: usize,
    pub duplicate_names: usize,
    /// Target name -> every source entry mapped to it. The same target
    /// name can legitimately recur across brands, so records are lists.
    pub entries: BTreeMap<String, Vec<IndexRecord>>,
}

/// Build the reverse index from an annotated source catalog.
pub fn build_reverse_index(catalog: &Catalog) -> ReverseIndex {
    let mut entries: BTreeMap<String, Vec<IndexRecord>> = BTreeMap::new();
    let mut total = 0;

    for brand in &catalog.brands {
        for model in &brand.children {
            let model_path = entry_path(&brand.source_id, &model.source_id);
            if let Some(target_name) = &model.mapped_name {
                entries.entry(target_name.clone()).or_default().push(IndexRecord {
                    brand: brand.name.clone(),
                    model: model.name.clone(),
                    submodel: None,
                    level: Level::Model,
                    entry_path: model_path.clone(),
                });
                total += 1;
            }
            for submodel in &model.children {
                if let Some(target_name) = &submodel.mapped_name {
                    entries.entry(target_name.clone()).or_default().push(IndexRecord {
                        brand: brand.name.clone(),
                        model: model.name.clone(),
                        submodel: Some(submodel.name.clone()),
                        level: Level::Submodel,
                        entry_path: entry_path(&model_path, &submodel.source_id),
                    });
                    total += 1;
                }
            }
        }
    }

    let mut duplicates = 0;
    for (name, records) in &entries {
        if records.len() > 1 {
            duplicates += 1;
            log::warn!(
                "Target name \"{name}\" is mapped from {} source entries",
                records.len()
            );
        }
    }

    ReverseIndex {
        generated_at: Utc::now(),
        total_mappings: total,
        duplicate_names: duplicates,
        entries,
    }
}

#[cfg(test)]
#[path = "tests/index_tests.rs"]
mod tests;
