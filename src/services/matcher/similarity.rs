//! Similarity scoring between normalized entry names.

use std::cmp::Ordering;

use super::normalizer::{compact, normalize};

/// Compact forms shorter than this never count as substring matches;
/// one- or two-letter fragments match far too much.
const MIN_SUBSTRING_LEN: usize = 3;

/// Score how likely two names refer to the same car.
///
/// Combined rule, in order:
/// - equal normalized forms score 1.0 (accent/case/separator variants)
/// - one compact form containing the other scores by length ratio
///   ("scouty" inside "scoutyr" gives 6/7)
/// - otherwise the Jaccard overlap of the normalized token sets
pub fn similarity_score(source: &str, target: &str) -> f32 {
    let source_norm = normalize(source);
    let target_norm = normalize(target);
    if source_norm.is_empty() || target_norm.is_empty() {
        return 0.0;
    }
    if source_norm == target_norm {
        return 1.0;
    }

    let source_compact = compact(source);
    let target_compact = compact(target);
    let (shorter, longer) = if source_compact.len() <= target_compact.len() {
        (&source_compact, &target_compact)
    } else {
        (&target_compact, &source_compact)
    };
    if shorter.len() >= MIN_SUBSTRING_LEN && longer.contains(shorter.as_str()) {
        return shorter.len() as f32 / longer.len() as f32;
    }

    token_overlap(&source_norm, &target_norm)
}

/// Jaccard ratio over whitespace-separated tokens of two normalized names.
fn token_overlap(a: &str, b: &str) -> f32 {
    let tokens_a: std::collections::HashSet<&str> = a.split_whitespace().collect();
    let tokens_b: std::collections::HashSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }
    let shared = tokens_a.intersection(&tokens_b).count();
    let total = tokens_a.union(&tokens_b).count();
    shared as f32 / total as f32
}

/// Pick the best-scoring candidate at or above `threshold`.
///
/// Candidates are `(position, name)` pairs in catalog order. Ties on score
/// go to the smaller edit distance between normalized forms, then to the
/// earlier catalog position, so the result is deterministic.
pub fn pick_best(
    source: &str,
    candidates: &[(usize, &str)],
    threshold: f32,
) -> Option<(usize, f32)> {
    let source_norm = normalize(source);
    let mut best: Option<(usize, f32, usize)> = None;

    for &(position, name) in candidates {
        let score = similarity_score(source, name);
        if score < threshold {
            continue;
        }
        let distance = strsim::levenshtein(&source_norm, &normalize(name));
        let better = match best {
            None => true,
            Some((_, best_score, best_distance)) => {
                match score.partial_cmp(&best_score).unwrap_or(Ordering::Equal) {
                    Ordering::Greater => true,
                    Ordering::Equal => distance < best_distance,
                    Ordering::Less => false,
                }
            }
        };
        if better {
            best = Some((position, score, distance));
        }
    }

    best.map(|(position, score, _)| (position, score))
}

#[cfg(test)]
#[path = "tests/similarity_tests.rs"]
mod tests;
