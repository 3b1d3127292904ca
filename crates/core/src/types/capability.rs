//! Discovered API capabilities.

use serde::{Deserialize, Deserializer, Serialize};

/// Entity/action name used when a capability arrives without one.
pub const UNKNOWN: &str = "unknown";

/// One discovered `(entity, action) -> (method, path)` fact.
///
/// `path` may contain `{name}` placeholders. Several capabilities can share
/// the same entity and action; picking between them is the job of the
/// selection step.
///
/// `score` is only ever written by the scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    /// Product this capability belongs to.
    #[serde(default)]
    pub product_id: String,
    /// Normalized entity (e.g. `contacts`, `organisations`).
    #[serde(default, deserialize_with = "null_as_empty")]
    pub entity_name: String,
    /// Normalized action (`list`, `get`, `create`, `update`, `delete`).
    #[serde(default, deserialize_with = "null_as_empty")]
    pub action: String,
    /// Upper-case HTTP method.
    pub http_method: String,
    /// Endpoint path template.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_schema: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
    /// Relevance score; higher is better.
    #[serde(default)]
    pub score: Option<f64>,
}

impl Capability {
    /// Create an unscored capability without schemas.
    #[must_use]
    pub fn new(
        product_id: impl Into<String>,
        entity_name: impl Into<String>,
        action: impl Into<String>,
        http_method: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            entity_name: entity_name.into(),
            action: action.into(),
            http_method: http_method.into(),
            path: path.into(),
            request_schema: None,
            response_schema: None,
            score: None,
        }
    }

    /// Copy of this capability carrying `score`.
    #[must_use]
    pub fn with_score(&self, score: f64) -> Self {
        Self {
            score: Some(score),
            ..self.clone()
        }
    }

    /// Entity name, or [`UNKNOWN`] when empty.
    #[must_use]
    pub fn entity_key(&self) -> &str {
        non_empty_or_unknown(&self.entity_name)
    }

    /// Action name, or [`UNKNOWN`] when empty.
    #[must_use]
    pub fn action_key(&self) -> &str {
        non_empty_or_unknown(&self.action)
    }

    /// Score used for ordering; unscored capabilities rank as `0.0`.
    #[must_use]
    pub fn score_or_zero(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }
}

/// Accept `null` wherever an empty name is accepted.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_empty_or_unknown(value: &str) -> &str {
    if value.is_empty() { UNKNOWN } else { value }
}
