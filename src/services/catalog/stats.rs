//! Catalog statistics: per-level totals, mapping coverage, top brands.

use super::model::Catalog;

/// Placeholder model names the scraper emits for brands it could not expand.
const PLACEHOLDER_MODELS: &[&str] = &["outros modelos", "other models", "others"];

const TOP_BRAND_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandCount {
    pub name: String,
    pub models: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CatalogStats {
    pub total_brands: usize,
    pub total_models: usize,
    pub total_submodels: usize,
    pub mapped_models: usize,
    pub mapped_submodels: usize,
    pub top_brands: Vec<BrandCount>,
    pub incomplete_brands: Vec<String>,
}

impl CatalogStats {
    pub fn collect(catalog: &Catalog) -> Self {
        let mut stats = CatalogStats {
            total_brands: catalog.brands.len(),
            ..CatalogStats::default()
        };

        let mut counts: Vec<BrandCount> = Vec::new();
        for brand in &catalog.brands {
            stats.total_models += brand.children.len();
            for model in &brand.children {
                if model.is_mapped() {
                    stats.mapped_models += 1;
                }
                stats.total_submodels += model.children.len();
                stats.mapped_submodels +=
                    model.children.iter().filter(|sub| sub.is_mapped()).count();
            }

            if is_incomplete(brand) {
                stats.incomplete_brands.push(brand.name.clone());
            } else {
                counts.push(BrandCount {
                    name: brand.name.clone(),
                    models: brand.children.len(),
                });
            }
        }

        counts.sort_by(|a, b| b.models.cmp(&a.models).then_with(|| a.name.cmp(&b.name)));
        counts.truncate(TOP_BRAND_LIMIT);
        stats.top_brands = counts;
        stats
    }
}

/// One model line of a brand detail listing.
#[derive(Debug, Clone)]
pub struct ModelLine {
    pub name: String,
    pub mapped_name: Option<String>,
    pub submodels: usize,
    pub mapped_submodels: usize,
}

/// Per-brand drill-down used by the stats command.
pub fn brand_detail(catalog: &Catalog, brand_name: &str) -> Option<Vec<ModelLine>> {
    let brand = catalog.brand(brand_name)?;
    let lines = brand
        .children
        .iter()
        .map(|model| ModelLine {
            name: model.name.clone(),
            mapped_name: model.mapped_name.clone(),
            submodels: model.children.len(),
            mapped_submodels: model.children.iter().filter(|sub| sub.is_mapped()).count(),
        })
        .collect();
    Some(lines)
}

fn is_incomplete(brand: &super::model::CatalogEntry) -> bool {
    brand.children.len() == 1
        && PLACEHOLDER_MODELS.contains(&brand.children[0].name.to_lowercase().as_str())
}

#[cfg(test)]
#[path = "tests/stats_tests.rs"]
mod tests;
