//! Capability scoring, grouping and endpoint selection.
//!
//! The pipeline is:
//!
//! 1. **Score** - [`score_capabilities`] assigns a deterministic relevance score
//! 2. **Group** - [`group_by_entity_and_action`] buckets by `(entity, action)`
//! 3. **Detect** - [`detect_ambiguities`] reports buckets with several candidates
//! 4. **Resolve** - an [`AmbiguityResolver`] picks one candidate per ambiguity
//! 5. **Build** - [`build_mapping`] produces the persisted [`EndpointMapping`]
//!
//! [`select_endpoints`] runs all five steps.
//!
//! [`EndpointMapping`]: toolkit_engine_core::EndpointMapping

mod error;
mod grouping;
mod mapping;
mod resolve;
mod scoring;

pub use error::SelectionError;
pub use grouping::{AmbiguityRecord, GroupIndex, detect_ambiguities, group_by_entity_and_action};
pub use mapping::build_mapping;
pub use resolve::{
    AmbiguityResolver, AutoResolver, ResolutionRequest, SelectionOutcome, auto_select_best,
    resolution_request, resolve_ambiguities, select_endpoints,
};
pub use scoring::{
    DEPRIORITIZED_TERMS, PRIORITY_ACTIONS, PRIORITY_ENTITIES, score_capabilities,
    score_capability,
};
