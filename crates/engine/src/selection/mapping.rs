//! Building the endpoint mapping from grouped capabilities.

use toolkit_engine_core::{Endpoint, EndpointMapping, Selections};
use tracing::debug;

use super::GroupIndex;

/// Resolve every bucket to one endpoint.
///
/// Each `(entity, action)` uses its recorded selection index, or `0` when no
/// selection was recorded. An index outside the bucket drops that action from
/// the mapping without an error: recorded selections may be stale, and the
/// interactive path already validates strictly.
///
/// Buckets must be in the order the selection indices were computed against.
/// Every entity in `index` appears in the mapping, even if all of its actions
/// were dropped.
#[must_use]
pub fn build_mapping(index: &GroupIndex, selections: &Selections) -> EndpointMapping {
    let mut mapping = EndpointMapping::new();

    for entity in index.entities() {
        mapping.ensure_entity(entity);
    }

    for (entity, action, caps) in index.iter() {
        let selected = selections.get(entity, action).unwrap_or(0);

        let Some(cap) = caps.get(selected) else {
            debug!(
                entity,
                action,
                selected,
                candidates = caps.len(),
                "Dropping out-of-range selection"
            );
            continue;
        };

        mapping.insert(entity, action, Endpoint::new(&cap.http_method, &cap.path));
    }

    mapping
}
