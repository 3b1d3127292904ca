//! Endpoint mappings and selection indices.
//!
//! Both are nested `entity -> action -> value` tables. They use
//! [`IndexMap`] so iteration and the persisted JSON keep insertion order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The resolved endpoint for one entity/action pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// Upper-case HTTP method.
    pub http_method: String,
    /// Path template, possibly with `{name}` placeholders.
    pub path: String,
}

impl Endpoint {
    #[must_use]
    pub fn new(http_method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            http_method: http_method.into(),
            path: path.into(),
        }
    }
}

/// One endpoint per `(entity, action)`; drives the uniform client.
///
/// Serialized as `{"contacts": {"list": {"http_method": .., "path": ..}}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointMapping(IndexMap<String, IndexMap<String, Endpoint>>);

impl EndpointMapping {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the endpoint for `entity.action`.
    #[must_use]
    pub fn get(&self, entity: &str, action: &str) -> Option<&Endpoint> {
        self.0.get(entity).and_then(|actions| actions.get(action))
    }

    /// Ensure `entity` has a (possibly empty) action table.
    pub fn ensure_entity(&mut self, entity: &str) -> &mut IndexMap<String, Endpoint> {
        self.0.entry(entity.to_owned()).or_default()
    }

    /// Insert or replace the endpoint for `entity.action`.
    pub fn insert(&mut self, entity: &str, action: &str, endpoint: Endpoint) {
        self.ensure_entity(entity).insert(action.to_owned(), endpoint);
    }

    /// Iterate entities with their action tables, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &IndexMap<String, Endpoint>)> {
        self.0.iter()
    }

    /// Number of entities (including entities with no actions).
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.0.len()
    }

    /// Total number of mapped actions across all entities.
    #[must_use]
    pub fn endpoint_count(&self) -> usize {
        self.0.values().map(IndexMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Chosen bucket index per `(entity, action)`.
///
/// Indices refer to the bucket order at the moment they were recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selections(IndexMap<String, IndexMap<String, usize>>);

impl Selections {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `index` for `entity.action`, replacing any earlier choice.
    pub fn select(&mut self, entity: &str, action: &str, index: usize) {
        self.0
            .entry(entity.to_owned())
            .or_default()
            .insert(action.to_owned(), index);
    }

    /// Recorded index for `entity.action`, if any.
    #[must_use]
    pub fn get(&self, entity: &str, action: &str) -> Option<usize> {
        self.0
            .get(entity)
            .and_then(|actions| actions.get(action))
            .copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.values().map(IndexMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
