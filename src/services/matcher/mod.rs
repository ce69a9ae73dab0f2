mod ai;
mod engine;
mod normalizer;
mod openai;
mod similarity;
mod types;

pub use ai::{
    build_batch_key, resolve_suggestions, AiSuggestion, SuggestionBatch, SuggestionCache,
    SuggestionProvider, SuggestionQuery,
};
pub use engine::{match_brand, AiContext};
pub use normalizer::{compact, normalize};
pub use openai::{HttpSuggestionProvider, SUGGESTION_CONFIDENCE};
pub use similarity::{pick_best, similarity_score};
pub use types::{BrandProposal, MatchCandidate, MatchMethod, MatcherConfig, MethodCounts};
