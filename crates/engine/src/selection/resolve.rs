//! Resolving ambiguous buckets to a single endpoint.
//!
//! The engine never talks to a terminal. Each ambiguity becomes a
//! [`ResolutionRequest`] with candidates ordered best-first, and an injected
//! [`AmbiguityResolver`] answers with an index into that order. Indices are
//! validated strictly here; [`build_mapping`](super::build_mapping) later
//! trusts them.

use serde::Serialize;
use toolkit_engine_core::{Capability, EndpointMapping, Selections};
use tracing::{debug, info, instrument};

use super::grouping::sort_by_score_desc;
use super::{
    AmbiguityRecord, GroupIndex, SelectionError, build_mapping, detect_ambiguities,
    group_by_entity_and_action, score_capabilities,
};

/// A question for a resolver: which of these candidates should back
/// `entity_name.action`?
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionRequest {
    pub entity_name: String,
    pub action: String,
    /// Candidates by descending score; ties keep discovery order.
    pub candidates: Vec<Capability>,
}

/// Build the resolution request for an ambiguity record.
#[must_use]
pub fn resolution_request(record: &AmbiguityRecord) -> ResolutionRequest {
    let mut candidates = record.capabilities.clone();
    sort_by_score_desc(&mut candidates);

    ResolutionRequest {
        entity_name: record.entity_name.clone(),
        action: record.action.clone(),
        candidates,
    }
}

/// Chooses one candidate per ambiguous bucket.
pub trait AmbiguityResolver {
    /// Return an index into `request.candidates`.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError::Cancelled` if no choice can be made.
    fn resolve(&mut self, request: &ResolutionRequest) -> Result<usize, SelectionError>;
}

/// Always picks the highest-scored candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoResolver;

impl AmbiguityResolver for AutoResolver {
    fn resolve(&mut self, request: &ResolutionRequest) -> Result<usize, SelectionError> {
        if request.candidates.is_empty() {
            return Err(SelectionError::EmptyCandidates);
        }
        Ok(0)
    }
}

/// Pick the highest-scored capability.
///
/// Unscored capabilities rank as `0.0`; ties go to the earliest candidate.
///
/// # Errors
///
/// Returns `SelectionError::EmptyCandidates` for an empty slice.
pub fn auto_select_best(capabilities: &[Capability]) -> Result<&Capability, SelectionError> {
    let mut best: Option<&Capability> = None;
    for cap in capabilities {
        if best.is_none_or(|b| cap.score_or_zero() > b.score_or_zero()) {
            best = Some(cap);
        }
    }
    best.ok_or(SelectionError::EmptyCandidates)
}

/// Ask `resolver` about every ambiguity and record its answers.
///
/// Each answered bucket in `index` is re-sorted to the order the resolver
/// saw, so the returned indices line up with `index` for `build_mapping`.
///
/// # Errors
///
/// Returns `SelectionError::OutOfRange` for an index outside the candidates,
/// or whatever error the resolver itself returns.
pub fn resolve_ambiguities(
    index: &mut GroupIndex,
    ambiguities: &[AmbiguityRecord],
    resolver: &mut dyn AmbiguityResolver,
) -> Result<Selections, SelectionError> {
    let mut selections = Selections::new();

    for record in ambiguities {
        let request = resolution_request(record);
        let choice = resolver.resolve(&request)?;

        if choice >= request.candidates.len() {
            return Err(SelectionError::OutOfRange {
                entity: request.entity_name,
                action: request.action,
                index: choice,
                candidates: request.candidates.len(),
            });
        }

        index.sort_bucket_by_score(&record.entity_name, &record.action);
        selections.select(&record.entity_name, &record.action, choice);
        debug!(
            entity = %record.entity_name,
            action = %record.action,
            choice,
            "Recorded selection"
        );
    }

    Ok(selections)
}

/// Result of a full selection run.
#[derive(Debug, Clone)]
pub struct SelectionOutcome {
    /// The resolved mapping.
    pub mapping: EndpointMapping,
    /// How many buckets needed a decision.
    pub ambiguities: usize,
    /// How many capabilities went in.
    pub capabilities: usize,
}

/// Score, group, resolve and build a mapping in one go.
///
/// # Errors
///
/// Propagates resolver errors and out-of-range answers.
#[instrument(skip_all, fields(capabilities = capabilities.len()))]
pub fn select_endpoints(
    capabilities: &[Capability],
    resolver: &mut dyn AmbiguityResolver,
) -> Result<SelectionOutcome, SelectionError> {
    let scored = score_capabilities(capabilities);
    let mut index = group_by_entity_and_action(scored);
    let ambiguities = detect_ambiguities(&index);

    info!(
        buckets = index.bucket_count(),
        ambiguities = ambiguities.len(),
        "Grouped capabilities"
    );

    let selections = resolve_ambiguities(&mut index, &ambiguities, resolver)?;
    let mapping = build_mapping(&index, &selections);

    Ok(SelectionOutcome {
        mapping,
        ambiguities: ambiguities.len(),
        capabilities: capabilities.len(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use toolkit_engine_core::Endpoint;

    use super::*;

    fn cap(entity: &str, action: &str, path: &str) -> Capability {
        Capability::new("test", entity, action, "GET", path)
    }

    /// Replays scripted answers and remembers what it was asked.
    struct ScriptedResolver {
        answers: Vec<usize>,
        seen: Vec<ResolutionRequest>,
    }

    impl ScriptedResolver {
        fn new(answers: &[usize]) -> Self {
            Self {
                answers: answers.iter().rev().copied().collect(),
                seen: Vec::new(),
            }
        }
    }

    impl AmbiguityResolver for ScriptedResolver {
        fn resolve(&mut self, request: &ResolutionRequest) -> Result<usize, SelectionError> {
            self.seen.push(request.clone());
            self.answers
                .pop()
                .ok_or_else(|| SelectionError::Cancelled("no more answers".to_string()))
        }
    }

    #[test]
    fn test_resolution_request_orders_by_score() {
        let record = AmbiguityRecord {
            entity_name: "contacts".to_string(),
            action: "list".to_string(),
            capabilities: vec![
                cap("contacts", "list", "/a").with_score(1.0),
                cap("contacts", "list", "/b").with_score(3.0),
                cap("contacts", "list", "/c").with_score(2.0),
            ],
        };
        let request = resolution_request(&record);
        let paths: Vec<&str> = request.candidates.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, ["/b", "/c", "/a"]);
        // The record itself is untouched
        assert_eq!(record.capabilities[0].path, "/a");
    }

    #[test]
    fn test_auto_select_best_single() {
        let caps = vec![cap("contacts", "list", "/contacts").with_score(4.0)];
        assert_eq!(auto_select_best(&caps).unwrap().path, "/contacts");
    }

    #[test]
    fn test_auto_select_best_multiple() {
        let caps = vec![
            cap("contacts", "list", "/low").with_score(1.0),
            cap("contacts", "list", "/high").with_score(9.5),
            cap("contacts", "list", "/unscored"),
        ];
        assert_eq!(auto_select_best(&caps).unwrap().path, "/high");
    }

    #[test]
    fn test_auto_select_best_tie_prefers_first() {
        let caps = vec![
            cap("contacts", "list", "/first").with_score(2.0),
            cap("contacts", "list", "/second").with_score(2.0),
        ];
        assert_eq!(auto_select_best(&caps).unwrap().path, "/first");
    }

    #[test]
    fn test_auto_select_best_empty_fails() {
        assert!(matches!(
            auto_select_best(&[]),
            Err(SelectionError::EmptyCandidates)
        ));
    }

    #[test]
    fn test_selection_indices_refer_to_sorted_order() {
        // Discovery order puts the search endpoint first; scoring ranks it last
        let caps = vec![
            cap("contacts", "list", "/crm/v3/objects/contacts/search"),
            cap("contacts", "list", "/crm/v3/objects/contacts"),
        ];
        let mut resolver = ScriptedResolver::new(&[0]);
        let outcome = select_endpoints(&caps, &mut resolver).unwrap();

        assert_eq!(outcome.ambiguities, 1);
        assert_eq!(resolver.seen[0].candidates[0].path, "/crm/v3/objects/contacts");
        assert_eq!(
            outcome.mapping.get("contacts", "list"),
            Some(&Endpoint::new("GET", "/crm/v3/objects/contacts"))
        );
    }

    #[test]
    fn test_operator_can_pick_lower_ranked_candidate() {
        let caps = vec![
            cap("contacts", "list", "/crm/v3/objects/contacts/search"),
            cap("contacts", "list", "/crm/v3/objects/contacts"),
        ];
        let mut resolver = ScriptedResolver::new(&[1]);
        let outcome = select_endpoints(&caps, &mut resolver).unwrap();

        assert_eq!(
            outcome.mapping.get("contacts", "list").unwrap().path,
            "/crm/v3/objects/contacts/search"
        );
    }

    #[test]
    fn test_out_of_range_answer_is_rejected() {
        let caps = vec![cap("contacts", "list", "/a"), cap("contacts", "list", "/b")];
        let mut resolver = ScriptedResolver::new(&[2]);
        let err = select_endpoints(&caps, &mut resolver).unwrap_err();
        assert!(matches!(
            err,
            SelectionError::OutOfRange { index: 2, candidates: 2, .. }
        ));
    }

    #[test]
    fn test_resolver_error_propagates() {
        let caps = vec![cap("deals", "get", "/a/{id}"), cap("deals", "get", "/b/{id}")];
        let mut resolver = ScriptedResolver::new(&[]);
        assert!(matches!(
            select_endpoints(&caps, &mut resolver),
            Err(SelectionError::Cancelled(_))
        ));
    }

    #[test]
    fn test_no_ambiguity_never_asks() {
        let caps = vec![cap("contacts", "list", "/c"), cap("contacts", "get", "/c/{id}")];
        let mut resolver = ScriptedResolver::new(&[]);
        let outcome = select_endpoints(&caps, &mut resolver).unwrap();

        assert!(resolver.seen.is_empty());
        assert_eq!(outcome.ambiguities, 0);
        assert_eq!(outcome.capabilities, 2);
        assert_eq!(outcome.mapping.endpoint_count(), 2);
    }

    #[test]
    fn test_auto_resolver_picks_best() {
        let caps = vec![
            cap("organisations", "get", "/crm/v3/objects/companies/batch/read"),
            cap("organisations", "get", "/crm/v3/objects/companies/{companyId}"),
        ];
        let outcome = select_endpoints(&caps, &mut AutoResolver).unwrap();
        assert_eq!(
            outcome.mapping.get("organisations", "get").unwrap().path,
            "/crm/v3/objects/companies/{companyId}"
        );
    }
}
