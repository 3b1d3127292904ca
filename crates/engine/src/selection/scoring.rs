//! Deterministic relevance scoring for discovered capabilities.
//!
//! Scores are purely additive over independent signals and only meaningful
//! for ordering capabilities against each other. Ties are left for callers to
//! break.

use toolkit_engine_core::Capability;

/// Entities the uniform client cares about most.
pub const PRIORITY_ENTITIES: &[&str] = &["contacts", "organisations", "deals", "companies"];

/// CRUD-style actions.
pub const PRIORITY_ACTIONS: &[&str] = &["list", "get", "create", "update", "delete"];

/// Path fragments that mark specialised endpoints (bulk, search, compliance).
pub const DEPRIORITIZED_TERMS: &[&str] = &["batch", "search", "merge", "archive", "gdpr"];

const PRIORITY_ENTITY_BONUS: f64 = 10.0;
const PRIORITY_ACTION_BONUS: f64 = 8.0;
const DEPRIORITIZED_TERM_PENALTY: f64 = 5.0;
const PATH_LENGTH_WEIGHT: f64 = 10.0;

/// Score every capability.
///
/// Returns copies in the same order as the input with `score` set,
/// overwriting any previous value. No other field changes.
#[must_use]
pub fn score_capabilities(capabilities: &[Capability]) -> Vec<Capability> {
    capabilities
        .iter()
        .map(|cap| cap.with_score(score_capability(cap)))
        .collect()
}

/// Relevance score of a single capability.
///
/// - priority entity: `+10`
/// - priority action: `+8`
/// - each distinct deprioritized term in the path: `-5`
/// - `10 / segments` for paths with at least one non-empty segment
#[must_use]
pub fn score_capability(cap: &Capability) -> f64 {
    let mut score = 0.0;

    let entity = cap.entity_name.to_lowercase();
    if PRIORITY_ENTITIES.contains(&entity.as_str()) {
        score += PRIORITY_ENTITY_BONUS;
    }

    let action = cap.action.to_lowercase();
    if PRIORITY_ACTIONS.contains(&action.as_str()) {
        score += PRIORITY_ACTION_BONUS;
    }

    let path = cap.path.to_lowercase();
    for term in DEPRIORITIZED_TERMS {
        if path.contains(term) {
            score -= DEPRIORITIZED_TERM_PENALTY;
        }
    }

    let segments = path_segments(&cap.path);
    if segments > 0 {
        #[allow(clippy::cast_precision_loss)] // segment counts are tiny
        let segments = segments as f64;
        score += PATH_LENGTH_WEIGHT / segments;
    }

    score
}

/// Number of non-empty `/`-separated segments in `path`.
fn path_segments(path: &str) -> usize {
    path.split('/').filter(|s| !s.is_empty()).count()
}
