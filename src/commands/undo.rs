use std::path::Path;

use crate::services::catalog::{CatalogStorage, JsonCatalogStorage};
use crate::services::pipeline::StartMode;
use crate::services::session::{JsonProgressStorage, ProgressStorage, SessionManager};
use crate::types::AppResult;

pub fn run(source: &Path, progress: &Path) -> AppResult<()> {
    let progress_storage = JsonProgressStorage::new(progress);
    let Some(state) = progress_storage.load()? else {
        println!("No mapping session found, nothing to undo.");
        return Ok(());
    };

    let source_storage = JsonCatalogStorage::new(source);
    let mut catalog = source_storage.load()?;

    let brand_order = state.brand_order.clone();
    let mut session = SessionManager::open(Box::new(progress_storage), brand_order, &StartMode::Resume)?;
    let removed = session.undo_all(&mut catalog)?;
    // Keep the ledger until the cleared catalog is on disk.
    source_storage.save(&catalog)?;
    session.delete_progress()?;

    log::info!("Undo cleared {removed} mappings");
    println!("Cleared {removed} mappings and reset the session.");
    Ok(())
}
