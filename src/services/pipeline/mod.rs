mod control;

pub use control::{ControlSurface, Decision, ResumePoint, StartMode};

use std::collections::BTreeSet;

use crate::services::catalog::{CatalogStorage, CatalogStore, Level};
use crate::services::matcher::{match_brand, AiContext, MatcherConfig, MethodCounts};
use crate::services::session::SessionManager;
use crate::types::AppResult;

/// Aggregate outcome of one mapping run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub brands_confirmed: usize,
    pub brands_skipped: usize,
    pub models_mapped: usize,
    pub submodels_mapped: usize,
    pub counts: MethodCounts,
    pub quit_early: bool,
}

/// Drives the per-brand loop: match, present, apply, record.
///
/// All catalog writes for a brand happen after its confirm signal, as one
/// batch followed immediately by the catalog save and the session commit.
/// A quit touches neither the catalog nor the session cursor, so the same
/// brand comes up again on the next resume.
pub struct Orchestrator<'a> {
    store: &'a mut CatalogStore,
    catalog_storage: &'a dyn CatalogStorage,
    session: &'a mut SessionManager,
    config: &'a MatcherConfig,
    ai: AiContext<'a>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        store: &'a mut CatalogStore,
        catalog_storage: &'a dyn CatalogStorage,
        session: &'a mut SessionManager,
        config: &'a MatcherConfig,
        ai: AiContext<'a>,
    ) -> Self {
        Self {
            store,
            catalog_storage,
            session,
            config,
            ai,
        }
    }

    pub fn run(&mut self, control: &mut dyn ControlSurface) -> AppResult<RunSummary> {
        let mut summary = RunSummary::default();
        let total = self.session.state().brand_order.len();

        while let Some(brand) = self.session.next_pending_brand() {
            let proposal = match_brand(self.store, &brand, self.config, &self.ai);

            if proposal.is_empty() {
                log::info!("No new candidates for {brand}, skipping");
                self.session.skip(&brand)?;
                summary.brands_skipped += 1;
                continue;
            }

            let position = self
                .session
                .state()
                .position_of(&brand)
                .map_or(0, |p| p + 1);
            match control.decide(&proposal, position, total)? {
                Decision::Confirm => {
                    let mut applied = BTreeSet::new();
                    for candidate in &proposal.candidates {
                        if self
                            .store
                            .apply_mapping(&candidate.source_id, &candidate.target_name)
                        {
                            applied.insert(candidate.source_id.clone());
                            summary.counts.add(candidate.method);
                            if candidate.level == Level::Model {
                                summary.models_mapped += 1;
                            } else if candidate.level == Level::Submodel {
                                summary.submodels_mapped += 1;
                            }
                        }
                    }
                    // A failed save after confirm aborts the whole run.
                    self.catalog_storage.save(self.store.source()).map_err(|e| {
                        log::error!("Failed to save catalog after confirming {brand}: {e}");
                        e
                    })?;
                    self.session.commit(&brand, applied)?;
                    summary.brands_confirmed += 1;
                    log::info!("Confirmed {brand}");
                }
                Decision::Skip => {
                    self.session.skip(&brand)?;
                    summary.brands_skipped += 1;
                    log::info!("Skipped {brand}");
                }
                Decision::Quit => {
                    summary.quit_early = true;
                    log::info!("Quit before {brand}, progress kept");
                    break;
                }
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
#[path = "tests/pipeline_tests.rs"]
mod tests;
