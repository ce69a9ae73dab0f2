//! Shared matcher types: proposed links, per-method counters, tuning knobs.

use serde::{Deserialize, Serialize};

use crate::services::catalog::Level;

/// Which stage produced a match candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMethod {
    Exact,
    Similarity,
    Ai,
}

impl std::fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchMethod::Exact => write!(f, "exact"),
            MatchMethod::Similarity => write!(f, "similarity"),
            MatchMethod::Ai => write!(f, "ai"),
        }
    }
}

/// One proposed link from a source entry to a target name.
///
/// `source_id` is the slash-joined entry path inside the source catalog and
/// doubles as the undo identifier once the candidate is applied.
#[derive(Debug, Clone, Serialize)]
pub struct MatchCandidate {
    pub source_id: String,
    pub source_name: String,
    pub target_name: String,
    pub level: Level,
    pub method: MatchMethod,
    pub score: f32,
}

/// Per-method tallies for a proposal or a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MethodCounts {
    pub exact: usize,
    pub similarity: usize,
    pub ai: usize,
}

impl MethodCounts {
    pub fn add(&mut self, method: MatchMethod) {
        match method {
            MatchMethod::Exact => self.exact += 1,
            MatchMethod::Similarity => self.similarity += 1,
            MatchMethod::Ai => self.ai += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.exact + self.similarity + self.ai
    }
}

/// Everything the matcher proposes for one brand, across both levels.
#[derive(Debug, Clone, Default)]
pub struct BrandProposal {
    pub brand: String,
    pub candidates: Vec<MatchCandidate>,
}

impl BrandProposal {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn counts(&self) -> MethodCounts {
        let mut counts = MethodCounts::default();
        for candidate in &self.candidates {
            counts.add(candidate.method);
        }
        counts
    }

    pub fn models_mapped(&self) -> usize {
        self.candidates
            .iter()
            .filter(|c| c.level == Level::Model)
            .count()
    }

    pub fn submodels_mapped(&self) -> usize {
        self.candidates
            .iter()
            .filter(|c| c.level == Level::Submodel)
            .count()
    }
}

/// Matcher tuning knobs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Minimum similarity score a proposal must reach.
    pub similarity_threshold: f32,
    /// Score recorded for AI suggestions that carry no confidence.
    pub ai_default_score: f32,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.8,
            ai_default_score: 0.5,
        }
    }
}
