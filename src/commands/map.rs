use std::path::Path;

use crate::commands::ConsoleControl;
use crate::services::catalog::{CatalogStorage, CatalogStore, JsonCatalogStorage};
use crate::services::config::Settings;
use crate::services::matcher::{AiContext, HttpSuggestionProvider, SuggestionCache, SuggestionProvider};
use crate::services::pipeline::{ControlSurface, Orchestrator, ResumePoint, RunSummary, StartMode};
use crate::services::session::{JsonProgressStorage, ProgressStorage, SessionManager};
use crate::types::AppResult;

pub fn run(
    source: &Path,
    target: &Path,
    progress: &Path,
    from_brand: Option<String>,
    restart: bool,
    no_ai: bool,
) -> AppResult<()> {
    let settings = Settings::from_env();

    let source_storage = JsonCatalogStorage::new(source);
    let target_storage = JsonCatalogStorage::new(target);
    let mut store = CatalogStore::new(source_storage.load()?, target_storage.load()?);

    let brand_order = store.shared_brand_order();
    if brand_order.is_empty() {
        println!("The two catalogs share no brand, nothing to map.");
        return Ok(());
    }
    log::info!(
        "Mapping {} against {}: {} shared brands",
        settings.source_market,
        settings.target_market,
        brand_order.len()
    );

    let progress_storage = JsonProgressStorage::new(progress);
    let mut control = ConsoleControl;

    let mode = if restart {
        StartMode::FromBeginning
    } else if let Some(brand) = from_brand {
        StartMode::FromBrand(brand)
    } else {
        let resume = progress_storage
            .load()?
            .map(|state| ResumePoint::from_state(&state));
        control.choose_start(resume.as_ref())?
    };

    let mut session = SessionManager::open(Box::new(progress_storage), brand_order, &mode)?;

    // The provider and cache have to outlive the orchestrator borrowing them.
    let provider = if settings.ai.enabled && !no_ai {
        settings.ai.api_key.clone().map(|key| {
            HttpSuggestionProvider::new(
                key,
                settings.ai.base_url.clone(),
                Some(settings.ai.model.clone()),
            )
        })
    } else {
        None
    };
    let cache = SuggestionCache::default();
    let ai = AiContext {
        enabled: provider.is_some(),
        provider: provider.as_ref().map(|p| p as &dyn SuggestionProvider),
        cache: Some(&cache),
        source_market: &settings.source_market,
        target_market: &settings.target_market,
    };
    if ai.enabled {
        log::info!("AI suggestions enabled, model {}", settings.ai.model);
    } else {
        log::info!("AI suggestions disabled");
    }

    let summary = Orchestrator::new(
        &mut store,
        &source_storage,
        &mut session,
        &settings.matcher,
        ai,
    )
    .run(&mut control)?;

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("Mapping session finished.");
    println!("  Brands confirmed: {}", summary.brands_confirmed);
    println!("  Brands skipped:   {}", summary.brands_skipped);
    println!("  Models mapped:    {}", summary.models_mapped);
    println!("  Submodels mapped: {}", summary.submodels_mapped);
    println!(
        "  By method: {} exact, {} similarity, {} ai",
        summary.counts.exact, summary.counts.similarity, summary.counts.ai
    );
    if summary.quit_early {
        println!("Progress saved, run again to continue where you left off.");
    }
}
