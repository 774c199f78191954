//! Name similarity scoring and best-candidate selection.
//!
//! The scorer runs a three-branch cascade: exact match after
//! normalization, substring containment (partial names like "John"
//! inside "John Smith"), then Levenshtein-based similarity for
//! everything else. Scores are normalized to 0.0–1.0 so the reconciler
//! can threshold them uniformly.

use serde::{Deserialize, Serialize};

/// Minimum score a candidate must strictly exceed to be considered.
const MATCH_FLOOR: f64 = 0.5;

/// Containment matches are capped below an exact match.
const CONTAINMENT_WEIGHT: f64 = 0.9;

/// A projection of an existing person or organization used for matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    pub id: String,
    pub name: String,
}

/// The winning candidate from a [`best_match`] scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateMatch {
    pub id: String,
    pub name: String,
    pub score: f64,
}

pub(crate) fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Score the similarity of two names, 0.0–1.0.
///
/// Case- and surrounding-whitespace-insensitive. Lengths are measured in
/// chars, not bytes, so non-ASCII names score consistently.
pub fn similarity_score(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);

    if a == b {
        return 1.0;
    }

    // Partial-name containment (either direction). Rewards "John" inside
    // "John Smith" proportionally to how much of the longer name it covers.
    if a.contains(b.as_str()) || b.contains(a.as_str()) {
        let a_len = a.chars().count();
        let b_len = b.chars().count();
        let (shorter, longer) = if a_len < b_len { (a_len, b_len) } else { (b_len, a_len) };
        return shorter as f64 / longer as f64 * CONTAINMENT_WEIGHT;
    }

    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - strsim::levenshtein(&a, &b) as f64 / max_len as f64
}

/// Find the single best-scoring candidate strictly above the floor.
///
/// Ties go to the first-encountered candidate (strict `>` on updates).
/// Returns `None` when no candidate clears the floor, including for an
/// empty candidate list.
pub fn best_match(name: &str, candidates: &[CandidateRecord]) -> Option<CandidateMatch> {
    let mut best: Option<CandidateMatch> = None;

    for candidate in candidates {
        let score = similarity_score(name, &candidate.name);
        if score > MATCH_FLOOR && best.as_ref().is_none_or(|b| score > b.score) {
            best = Some(CandidateMatch {
                id: candidate.id.clone(),
                name: candidate.name.clone(),
                score,
            });
        }
    }

    best
}
