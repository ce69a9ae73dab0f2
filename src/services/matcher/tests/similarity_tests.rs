use super::*;

#[test]
fn test_score_one_for_normalized_equality() {
    assert_eq!(similarity_score("Coupé", "Coupe"), 1.0);
    assert_eq!(similarity_score("A-Class", "A Class"), 1.0);
    assert_eq!(similarity_score("GTI", "gti"), 1.0);
}

#[test]
fn test_score_substring_length_ratio() {
    // "scouty" inside "scoutyr": 6 of 7 characters.
    let score = similarity_score("Scouty", "Scouty R");
    assert!((score - 6.0 / 7.0).abs() < 1e-6);
    assert!(score >= 0.8);

    let score = similarity_score("120", "120d");
    assert!((score - 0.75).abs() < 1e-6);
}

#[test]
fn test_score_substring_needs_three_chars() {
    // One-character fragments fall through to token overlap.
    assert_eq!(similarity_score("X", "X5"), 0.0);
}

#[test]
fn test_score_token_overlap() {
    // Reordered tokens, no compact substring: full overlap.
    assert_eq!(similarity_score("Grand Picasso C4", "Grand C4 Picasso"), 1.0);

    // Two of three tokens shared.
    let score = similarity_score("red car", "red big car");
    assert!((score - 2.0 / 3.0).abs() < 1e-6);
}

#[test]
fn test_score_zero_for_empty_or_symbol_only() {
    assert_eq!(similarity_score("", "Golf"), 0.0);
    assert_eq!(similarity_score("!!!", "Golf"), 0.0);
    assert_eq!(similarity_score("Golf", ""), 0.0);
}

#[test]
fn test_pick_best_respects_threshold() {
    let candidates = [(0, "Polo"), (1, "Golf")];
    // "golf" inside "golfplus": 4 of 8 characters, below 0.8.
    assert_eq!(pick_best("Golf Plus", &candidates, 0.8), None);
    assert_eq!(pick_best("Golf Plus", &candidates, 0.5), Some((1, 0.5)));
}

#[test]
fn test_pick_best_prefers_higher_score() {
    let candidates = [(0, "Scouty RS"), (1, "Scouty R")];
    let (position, score) = pick_best("Scouty", &candidates, 0.5).unwrap();
    assert_eq!(position, 1);
    assert!((score - 6.0 / 7.0).abs() < 1e-6);
}

#[test]
fn test_pick_best_tie_breaks_on_edit_distance() {
    // Both score 2/3 on token overlap; the shorter edit wins even though
    // it comes later in catalog order.
    let candidates = [(0, "red enormous car"), (1, "red big car")];
    let (position, score) = pick_best("red car", &candidates, 0.6).unwrap();
    assert_eq!(position, 1);
    assert!((score - 2.0 / 3.0).abs() < 1e-6);
}

#[test]
fn test_pick_best_tie_breaks_on_catalog_order() {
    // Same score, same edit distance: the earlier candidate is kept.
    let candidates = [(0, "red big car"), (1, "red fat car")];
    let (position, _) = pick_best("red car", &candidates, 0.6).unwrap();
    assert_eq!(position, 0);
}

#[test]
fn test_pick_best_empty_candidates() {
    assert_eq!(pick_best("Golf", &[], 0.1), None);
}
