//! AI suggestion seam for entries the deterministic stages could not match.
//!
//! The provider is treated as an unreliable network dependency: any failure
//! degrades to "no suggestions for this batch" instead of aborting the run.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::services::catalog::Level;

/// One unmatched source entry plus the target names it may map onto.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionQuery {
    pub source_name: String,
    pub target_names: Vec<String>,
    /// Parent model name, set for submodel-level queries.
    pub parent_model: Option<String>,
}

/// All unmatched entries of one brand at one level, sent as a single call.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionBatch {
    pub brand: String,
    pub level: Level,
    pub source_market: String,
    pub target_market: String,
    pub queries: Vec<SuggestionQuery>,
}

/// A proposed target for one source name.
#[derive(Debug, Clone, PartialEq)]
pub struct AiSuggestion {
    pub target_name: String,
    pub confidence: Option<f32>,
}

pub trait SuggestionProvider: Send + Sync {
    /// Map source names to suggestions. Names absent from the result map
    /// received no suggestion.
    fn suggest(&self, batch: &SuggestionBatch) -> Result<HashMap<String, AiSuggestion>, String>;
}

/// Process-lifetime cache of provider responses keyed by batch content.
#[derive(Debug, Default)]
pub struct SuggestionCache {
    entries: Mutex<HashMap<String, HashMap<String, AiSuggestion>>>,
}

impl SuggestionCache {
    pub fn get(&self, key: &str) -> Option<HashMap<String, AiSuggestion>> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn insert(&self, key: String, suggestions: HashMap<String, AiSuggestion>) {
        self.entries.lock().unwrap().insert(key, suggestions);
    }
}

/// Content hash of a batch, stable across runs for identical inputs.
pub fn build_batch_key(batch: &SuggestionBatch) -> String {
    let mut digest = blake3::Hasher::new();
    update_string(&mut digest, b"brand", &batch.brand);
    update_string(&mut digest, b"level", &batch.level.to_string());
    update_string(&mut digest, b"source", &batch.source_market);
    update_string(&mut digest, b"target", &batch.target_market);
    for query in &batch.queries {
        update_string(&mut digest, b"name", &query.source_name);
        if let Some(parent) = &query.parent_model {
            update_string(&mut digest, b"parent", parent);
        }
        update_string_vec(&mut digest, b"candidates", &query.target_names);
    }
    digest.finalize().to_hex().to_string()
}

fn update_string(hasher: &mut blake3::Hasher, label: &[u8], value: &str) {
    hasher.update(label);
    let bytes = value.as_bytes();
    hasher.update(&(bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

fn update_string_vec(hasher: &mut blake3::Hasher, label: &[u8], values: &[String]) {
    hasher.update(label);
    for value in values {
        let bytes = value.as_bytes();
        hasher.update(&(bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    }
}

/// Fetch suggestions for a batch, going through the cache when one is given.
///
/// Provider errors are logged and swallowed; the empty map they produce is
/// cached too, so a failing batch is not retried within the same process.
pub fn resolve_suggestions(
    provider: &dyn SuggestionProvider,
    cache: Option<&SuggestionCache>,
    batch: &SuggestionBatch,
) -> HashMap<String, AiSuggestion> {
    if batch.queries.is_empty() {
        return HashMap::new();
    }

    let key = build_batch_key(batch);
    if let Some(cache_ref) = cache {
        if let Some(cached) = cache_ref.get(&key) {
            return cached;
        }
    }

    let suggestions: HashMap<String, AiSuggestion> = match provider.suggest(batch) {
        Ok(map) => map
            .into_iter()
            .map(|(name, mut suggestion)| {
                suggestion.confidence = suggestion.confidence.map(|c| c.clamp(0.0, 1.0));
                (name, suggestion)
            })
            .collect(),
        Err(e) => {
            log::warn!("AI suggestion call failed: {}", e);
            HashMap::new()
        }
    };

    if let Some(cache_ref) = cache {
        cache_ref.insert(key, suggestions.clone());
    }

    suggestions
}

#[cfg(test)]
#[path = "tests/ai_tests.rs"]
mod tests;
