//! Paired view over the two market catalogs being reconciled.

use std::collections::BTreeSet;

use super::model::{Catalog, CatalogEntry};

/// Holds the annotated source catalog next to the read-only target catalog.
///
/// All mapping mutations go through the source side; the target catalog is
/// never written.
pub struct CatalogStore {
    source: Catalog,
    target: Catalog,
}

impl CatalogStore {
    pub fn new(mut source: Catalog, mut target: Catalog) -> Self {
        source.normalize_ids();
        target.normalize_ids();
        Self { source, target }
    }

    pub fn source(&self) -> &Catalog {
        &self.source
    }

    pub fn target(&self) -> &Catalog {
        &self.target
    }

    /// Brand names present in both catalogs, sorted. Brands on one side
    /// only are never visited by the pipeline.
    pub fn shared_brand_order(&self) -> Vec<String> {
        let target_names: BTreeSet<&str> = self
            .target
            .brands
            .iter()
            .map(|brand| brand.name.as_str())
            .collect();
        let mut shared: Vec<String> = self
            .source
            .brands
            .iter()
            .filter(|brand| target_names.contains(brand.name.as_str()))
            .map(|brand| brand.name.clone())
            .collect();
        shared.sort();
        shared.dedup();
        shared
    }

    pub fn source_brand(&self, name: &str) -> Option<&CatalogEntry> {
        self.source.brand(name)
    }

    pub fn target_brand(&self, name: &str) -> Option<&CatalogEntry> {
        self.target.brand(name)
    }

    /// Apply one mapping onto the source catalog. See [`Catalog::apply_mapping`].
    pub fn apply_mapping(&mut self, path: &str, target_name: &str) -> bool {
        self.source.apply_mapping(path, target_name)
    }

    /// Clear one mapping from the source catalog.
    pub fn clear_mapping(&mut self, path: &str) -> bool {
        self.source.clear_mapping(path)
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
