use std::path::Path;

use crate::services::catalog::{brand_detail, CatalogStats, CatalogStorage, JsonCatalogStorage};
use crate::types::{AppError, AppResult};

pub fn run(source: &Path, brand: Option<&str>) -> AppResult<()> {
    let catalog = JsonCatalogStorage::new(source).load()?;

    if let Some(brand_name) = brand {
        let Some(lines) = brand_detail(&catalog, brand_name) else {
            return Err(AppError::NotFound(format!("Brand not in catalog: {brand_name}")));
        };

        println!("{brand_name}: {} models", lines.len());
        for line in lines {
            let mark = match &line.mapped_name {
                Some(mapped) => format!("-> {mapped}"),
                None => "(unmapped)".to_string(),
            };
            println!("  {} {mark}", line.name);
            if line.submodels > 0 {
                println!("    {}/{} submodels mapped", line.mapped_submodels, line.submodels);
            }
        }
        return Ok(());
    }

    let stats = CatalogStats::collect(&catalog);
    println!("Brands:    {}", stats.total_brands);
    println!("Models:    {} ({} mapped)", stats.total_models, stats.mapped_models);
    println!("Submodels: {} ({} mapped)", stats.total_submodels, stats.mapped_submodels);

    if !stats.top_brands.is_empty() {
        println!();
        println!("Largest brands:");
        for brand in &stats.top_brands {
            println!("  {}: {} models", brand.name, brand.models);
        }
    }

    if !stats.incomplete_brands.is_empty() {
        println!();
        println!("Brands with placeholder model lists:");
        for name in &stats.incomplete_brands {
            println!("  {name}");
        }
    }

    Ok(())
}
