//! Grouping capabilities by `(entity, action)` and detecting ambiguity.

use indexmap::IndexMap;
use serde::Serialize;
use toolkit_engine_core::Capability;

type Buckets = IndexMap<String, IndexMap<String, Vec<Capability>>>;

/// Capabilities bucketed by entity, then action.
///
/// Entities, actions and bucket contents keep insertion order, so iteration
/// is reproducible for identical input. Buckets are only created on insert and
/// are therefore never empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupIndex(Buckets);

impl GroupIndex {
    /// Iterate `(entity, action, bucket)` in index order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &[Capability])> {
        self.0.iter().flat_map(|(entity, actions)| {
            actions
                .iter()
                .map(move |(action, caps)| (entity.as_str(), action.as_str(), caps.as_slice()))
        })
    }

    /// Entity names in index order.
    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// The bucket for `entity.action`, if any capability landed there.
    #[must_use]
    pub fn bucket(&self, entity: &str, action: &str) -> Option<&[Capability]> {
        self.0
            .get(entity)
            .and_then(|actions| actions.get(action))
            .map(Vec::as_slice)
    }

    /// Reorder the bucket for `entity.action` by descending score.
    ///
    /// The sort is stable, so equal scores keep discovery order. Selection
    /// indices recorded afterwards refer to this new order.
    pub fn sort_bucket_by_score(&mut self, entity: &str, action: &str) -> Option<&[Capability]> {
        let bucket = self.0.get_mut(entity)?.get_mut(action)?;
        sort_by_score_desc(bucket);
        Some(bucket.as_slice())
    }

    /// Number of `(entity, action)` buckets.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.0.values().map(IndexMap::len).sum()
    }

    /// Total number of grouped capabilities.
    #[must_use]
    pub fn capability_count(&self) -> usize {
        self.iter().map(|(_, _, caps)| caps.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flatten back into a list, bucket by bucket.
    #[must_use]
    pub fn into_capabilities(self) -> Vec<Capability> {
        self.0
            .into_values()
            .flat_map(IndexMap::into_values)
            .flatten()
            .collect()
    }
}

/// A bucket holding more than one candidate endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmbiguityRecord {
    pub entity_name: String,
    pub action: String,
    pub capabilities: Vec<Capability>,
}

/// Bucket capabilities by `(entity, action)` in a single pass.
///
/// Missing entity or action names are filed under `"unknown"`.
pub fn group_by_entity_and_action<I>(capabilities: I) -> GroupIndex
where
    I: IntoIterator<Item = Capability>,
{
    let mut buckets = Buckets::new();

    for cap in capabilities {
        let entity = cap.entity_key().to_owned();
        let action = cap.action_key().to_owned();
        buckets
            .entry(entity)
            .or_default()
            .entry(action)
            .or_default()
            .push(cap);
    }

    GroupIndex(buckets)
}

/// One record per bucket with more than one capability, in index order.
#[must_use]
pub fn detect_ambiguities(index: &GroupIndex) -> Vec<AmbiguityRecord> {
    index
        .iter()
        .filter(|(_, _, caps)| caps.len() > 1)
        .map(|(entity, action, caps)| AmbiguityRecord {
            entity_name: entity.to_owned(),
            action: action.to_owned(),
            capabilities: caps.to_vec(),
        })
        .collect()
}

/// Stable sort by descending score; unscored capabilities rank as `0.0`.
pub(crate) fn sort_by_score_desc(capabilities: &mut [Capability]) {
    capabilities.sort_by(|a, b| b.score_or_zero().total_cmp(&a.score_or_zero()));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cap(entity: &str, action: &str, path: &str) -> Capability {
        Capability::new("test", entity, action, "GET", path)
    }

    fn sample() -> Vec<Capability> {
        vec![
            cap("contacts", "list", "/contacts"),
            cap("contacts", "get", "/contacts/{id}"),
            cap("deals", "create", "/deals"),
            cap("contacts", "list", "/contacts/search"),
        ]
    }

    #[test]
    fn test_group_structure() {
        let index = group_by_entity_and_action(sample());

        let entities: Vec<&str> = index.entities().collect();
        assert_eq!(entities, ["contacts", "deals"]);
        assert_eq!(index.bucket_count(), 3);

        let list = index.bucket("contacts", "list").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].path, "/contacts");
        assert_eq!(list[1].path, "/contacts/search");
    }

    #[test]
    fn test_group_flatten_recovers_input() {
        let input = sample();
        let index = group_by_entity_and_action(input.clone());
        assert_eq!(index.capability_count(), input.len());

        let mut flattened: Vec<String> = index
            .into_capabilities()
            .into_iter()
            .map(|c| format!("{}.{} {}", c.entity_name, c.action, c.path))
            .collect();
        let mut expected: Vec<String> = input
            .iter()
            .map(|c| format!("{}.{} {}", c.entity_name, c.action, c.path))
            .collect();
        flattened.sort();
        expected.sort();
        assert_eq!(flattened, expected);
    }

    #[test]
    fn test_group_missing_names_are_unknown() {
        let index = group_by_entity_and_action(vec![cap("", "", "/x"), cap("", "list", "/y")]);
        assert_eq!(index.bucket("unknown", "unknown").unwrap().len(), 1);
        assert_eq!(index.bucket("unknown", "list").unwrap().len(), 1);
    }

    #[test]
    fn test_group_empty() {
        let index = group_by_entity_and_action(Vec::new());
        assert!(index.is_empty());
        assert!(detect_ambiguities(&index).is_empty());
    }

    #[test]
    fn test_detect_no_ambiguity() {
        let index = group_by_entity_and_action(vec![
            cap("contacts", "list", "/contacts"),
            cap("contacts", "get", "/contacts/{id}"),
        ]);
        assert!(detect_ambiguities(&index).is_empty());
    }

    #[test]
    fn test_detect_ambiguities_matches_large_buckets() {
        let index = group_by_entity_and_action(vec![
            cap("contacts", "list", "/a"),
            cap("deals", "get", "/d/{id}"),
            cap("deals", "get", "/d2/{id}"),
            cap("contacts", "list", "/b"),
            cap("contacts", "list", "/c"),
            cap("deals", "list", "/d"),
        ]);
        let ambiguities = detect_ambiguities(&index);

        let large_buckets = index.iter().filter(|(_, _, caps)| caps.len() > 1).count();
        assert_eq!(ambiguities.len(), large_buckets);
        assert_eq!(ambiguities.len(), 2);

        assert_eq!(ambiguities[0].entity_name, "contacts");
        assert_eq!(ambiguities[0].action, "list");
        assert_eq!(ambiguities[0].capabilities.len(), 3);
        assert_eq!(ambiguities[1].entity_name, "deals");
        assert_eq!(ambiguities[1].action, "get");
    }

    #[test]
    fn test_sort_bucket_by_score_is_stable() {
        let mut index = group_by_entity_and_action(vec![
            cap("contacts", "list", "/low").with_score(1.0),
            cap("contacts", "list", "/tie-a").with_score(5.0),
            cap("contacts", "list", "/unscored"),
            cap("contacts", "list", "/tie-b").with_score(5.0),
        ]);

        let sorted = index.sort_bucket_by_score("contacts", "list").unwrap();
        let paths: Vec<&str> = sorted.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, ["/tie-a", "/tie-b", "/low", "/unscored"]);
    }

    #[test]
    fn test_sort_missing_bucket() {
        let mut index = group_by_entity_and_action(vec![cap("contacts", "list", "/a")]);
        assert!(index.sort_bucket_by_score("deals", "list").is_none());
    }
}
