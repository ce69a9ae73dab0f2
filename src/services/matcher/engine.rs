//! Three-stage matching engine: exact, similarity, then AI suggestions.
//!
//! Stages run in strict priority order per level; a source entry claims at
//! most one target and every target is claimed at most once per brand.

use crate::services::catalog::{entry_path, CatalogEntry, CatalogStore, Level};

use super::ai::{resolve_suggestions, SuggestionBatch, SuggestionCache, SuggestionProvider, SuggestionQuery};
use super::similarity::pick_best;
use super::types::{BrandProposal, MatchCandidate, MatchMethod, MatcherConfig};

/// AI stage wiring. With `enabled` false or no provider the stage is skipped
/// and the deterministic stages run alone.
#[derive(Default)]
pub struct AiContext<'a> {
    pub enabled: bool,
    pub provider: Option<&'a dyn SuggestionProvider>,
    pub cache: Option<&'a SuggestionCache>,
    pub source_market: &'a str,
    pub target_market: &'a str,
}

/// One source/target sibling set being matched: a brand's models, or the
/// submodels of one matched model pair.
struct PairScope<'a> {
    path_prefix: String,
    parent_model: Option<String>,
    sources: Vec<&'a CatalogEntry>,
    targets: Vec<&'a CatalogEntry>,
    /// Target names no longer available, seeded from mappings already on
    /// the source siblings and grown as stages claim targets.
    used_targets: std::collections::BTreeSet<String>,
    /// Indexes into `sources` still without a proposal.
    pending: Vec<usize>,
}

impl<'a> PairScope<'a> {
    fn new(
        path_prefix: String,
        parent_model: Option<String>,
        source_children: &'a [CatalogEntry],
        target_children: &'a [CatalogEntry],
    ) -> Self {
        let sources: Vec<&CatalogEntry> = source_children
            .iter()
            .filter(|entry| !entry.is_mapped())
            .collect();
        let used_targets = source_children
            .iter()
            .filter_map(|entry| entry.mapped_name.clone())
            .collect();
        let pending = (0..sources.len()).collect();
        Self {
            path_prefix,
            parent_model,
            sources,
            targets: target_children.iter().collect(),
            used_targets,
            pending,
        }
    }

    fn claim(
        &mut self,
        source_idx: usize,
        target_name: String,
        level: Level,
        method: MatchMethod,
        score: f32,
        out: &mut Vec<MatchCandidate>,
    ) {
        let source = self.sources[source_idx];
        out.push(MatchCandidate {
            source_id: entry_path(&self.path_prefix, &source.source_id),
            source_name: source.name.clone(),
            target_name: target_name.clone(),
            level,
            method,
            score,
        });
        self.used_targets.insert(target_name);
    }
}

/// Produce every match candidate for one brand, models then submodels.
///
/// Submodels are only compared inside model pairs that are matched, either
/// by a proposal from this pass or by a mapping already on the catalog.
pub fn match_brand(
    store: &CatalogStore,
    brand: &str,
    config: &MatcherConfig,
    ai: &AiContext<'_>,
) -> BrandProposal {
    let mut proposal = BrandProposal {
        brand: brand.to_string(),
        candidates: Vec::new(),
    };

    let Some(source_brand) = store.source_brand(brand) else {
        log::debug!("Brand {brand} missing from source catalog");
        return proposal;
    };
    let Some(target_brand) = store.target_brand(brand) else {
        log::debug!("Brand {brand} missing from target catalog");
        return proposal;
    };
    let brand_prefix = source_brand.source_id.clone();

    let mut model_scope = PairScope::new(
        brand_prefix.clone(),
        None,
        &source_brand.children,
        &target_brand.children,
    );
    run_exact_stage(&mut model_scope, Level::Model, &mut proposal.candidates);
    run_similarity_stage(&mut model_scope, Level::Model, config, &mut proposal.candidates);
    run_ai_stage(
        std::slice::from_mut(&mut model_scope),
        Level::Model,
        brand,
        config,
        ai,
        &mut proposal.candidates,
    );

    let mut submodel_scopes: Vec<PairScope> = Vec::new();
    for source_model in &source_brand.children {
        let model_path = entry_path(&brand_prefix, &source_model.source_id);
        let target_name = proposal
            .candidates
            .iter()
            .find(|c| c.level == Level::Model && c.source_id == model_path)
            .map(|c| c.target_name.clone())
            .or_else(|| source_model.mapped_name.clone());
        let Some(target_name) = target_name else {
            continue;
        };
        let Some(target_model) = target_brand.child_by_name(&target_name) else {
            log::debug!("No target model named {target_name} under {brand}");
            continue;
        };
        if source_model.children.is_empty() || target_model.children.is_empty() {
            continue;
        }
        submodel_scopes.push(PairScope::new(
            model_path,
            Some(source_model.name.clone()),
            &source_model.children,
            &target_model.children,
        ));
    }

    for scope in &mut submodel_scopes {
        run_exact_stage(scope, Level::Submodel, &mut proposal.candidates);
        run_similarity_stage(scope, Level::Submodel, config, &mut proposal.candidates);
    }
    run_ai_stage(
        &mut submodel_scopes,
        Level::Submodel,
        brand,
        config,
        ai,
        &mut proposal.candidates,
    );

    proposal
}

/// Claim targets whose raw name equals the source name.
fn run_exact_stage(scope: &mut PairScope<'_>, level: Level, out: &mut Vec<MatchCandidate>) {
    let pending = std::mem::take(&mut scope.pending);
    for source_idx in pending {
        let source_name = scope.sources[source_idx].name.clone();
        let hit = scope
            .targets
            .iter()
            .find(|t| t.name == source_name && !scope.used_targets.contains(&t.name))
            .map(|t| t.name.clone());
        match hit {
            Some(target_name) => {
                scope.claim(source_idx, target_name, level, MatchMethod::Exact, 1.0, out);
            }
            None => scope.pending.push(source_idx),
        }
    }
}

/// Claim the best free target scoring at or above the threshold.
fn run_similarity_stage(
    scope: &mut PairScope<'_>,
    level: Level,
    config: &MatcherConfig,
    out: &mut Vec<MatchCandidate>,
) {
    let pending = std::mem::take(&mut scope.pending);
    for source_idx in pending {
        let source_name = scope.sources[source_idx].name.clone();
        let free: Vec<(usize, &str)> = scope
            .targets
            .iter()
            .enumerate()
            .filter(|(_, t)| !scope.used_targets.contains(&t.name))
            .map(|(pos, t)| (pos, t.name.as_str()))
            .collect();
        let best = pick_best(&source_name, &free, config.similarity_threshold);
        match best {
            Some((pos, score)) => {
                let target_name = scope.targets[pos].name.clone();
                scope.claim(
                    source_idx,
                    target_name,
                    level,
                    MatchMethod::Similarity,
                    score,
                    out,
                );
            }
            None => scope.pending.push(source_idx),
        }
    }
}

/// One provider call for everything still unmatched at this level.
///
/// Suggestions are accepted in query order; a target already claimed by an
/// earlier acceptance is refused, so no target is assigned twice.
fn run_ai_stage(
    scopes: &mut [PairScope<'_>],
    level: Level,
    brand: &str,
    config: &MatcherConfig,
    ai: &AiContext<'_>,
    out: &mut Vec<MatchCandidate>,
) {
    if !ai.enabled {
        return;
    }
    let Some(provider) = ai.provider else {
        return;
    };

    let mut slots: Vec<(usize, usize)> = Vec::new();
    let mut queries: Vec<SuggestionQuery> = Vec::new();
    for (scope_idx, scope) in scopes.iter().enumerate() {
        for &source_idx in &scope.pending {
            let free: Vec<String> = scope
                .targets
                .iter()
                .filter(|t| !scope.used_targets.contains(&t.name))
                .map(|t| t.name.clone())
                .collect();
            if free.is_empty() {
                continue;
            }
            slots.push((scope_idx, source_idx));
            queries.push(SuggestionQuery {
                source_name: scope.sources[source_idx].name.clone(),
                target_names: free,
                parent_model: scope.parent_model.clone(),
            });
        }
    }
    if queries.is_empty() {
        return;
    }

    let batch = SuggestionBatch {
        brand: brand.to_string(),
        level,
        source_market: ai.source_market.to_string(),
        target_market: ai.target_market.to_string(),
        queries,
    };
    let suggestions = resolve_suggestions(provider, ai.cache, &batch);
    if suggestions.is_empty() {
        return;
    }

    for ((scope_idx, source_idx), query) in slots.into_iter().zip(&batch.queries) {
        let Some(suggestion) = suggestions.get(&query.source_name) else {
            continue;
        };
        let scope = &mut scopes[scope_idx];
        if scope.used_targets.contains(&suggestion.target_name) {
            log::debug!(
                "AI suggestion {} -> {} refused, target already claimed",
                query.source_name,
                suggestion.target_name
            );
            continue;
        }
        if !scope.targets.iter().any(|t| t.name == suggestion.target_name) {
            log::debug!(
                "AI suggestion {} -> {} refused, unknown target",
                query.source_name,
                suggestion.target_name
            );
            continue;
        }
        let score = suggestion.confidence.unwrap_or(config.ai_default_score);
        let target_name = suggestion.target_name.clone();
        scope.pending.retain(|&idx| idx != source_idx);
        scope.claim(source_idx, target_name, level, MatchMethod::Ai, score, out);
    }
}

#[cfg(test)]
#[path = "tests/engine_tests.rs"]
mod tests;
