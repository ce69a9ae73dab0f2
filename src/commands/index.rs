use std::path::Path;

use crate::services::catalog::{atomic_write_json, build_reverse_index, CatalogStorage, JsonCatalogStorage};
use crate::types::AppResult;

pub fn run(source: &Path, out: &Path) -> AppResult<()> {
    let catalog = JsonCatalogStorage::new(source).load()?;
    let index = build_reverse_index(&catalog);

    atomic_write_json(out, &index)?;

    log::info!("Reverse index written to {}", out.display());
    println!(
        "Indexed {} mappings under {} target names ({} duplicated).",
        index.total_mappings,
        index.entries.len(),
        index.duplicate_names
    );
    Ok(())
}
