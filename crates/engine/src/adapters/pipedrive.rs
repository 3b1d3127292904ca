//! Pipedrive CRM adapter.
//!
//! Pipedrive authenticates with an `api_token` query parameter, which the
//! request executor injects. The adapter only checks that the token exists.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde_json::Value;
use toolkit_engine_core::{Capability, ProductDefinition};
use tracing::instrument;

use super::openapi::{self, PathRules};
use super::{AdapterError, ProductAdapter};
use crate::client::{API_TOKEN, Credentials};

/// Published OpenAPI document for the v1 API.
pub const PIPEDRIVE_SPEC_URL: &str = "https://developers.pipedrive.com/docs/api/v1/openapi.json";

const SPEC_TIMEOUT: Duration = Duration::from_secs(15);
const VENDOR: &str = "Pipedrive";

const RULES: PathRules = PathRules {
    vendor: VENDOR,
    methods: &["get", "post", "put", "delete"],
    detect_entity,
    detect_action,
};

/// Entity for a Pipedrive path. Persons are contacts, organizations are
/// `organisations`.
#[must_use]
pub fn detect_entity(path: &str) -> Option<&'static str> {
    let path = path.to_ascii_lowercase();
    if path.contains("/persons") {
        Some("contacts")
    } else if path.contains("/organizations") {
        Some("organisations")
    } else if path.contains("/deals") {
        Some("deals")
    } else if path.contains("/activities") {
        Some("activities")
    } else if path.contains("/products") {
        Some("products")
    } else {
        None
    }
}

/// Action for an upper-case method and path. Only PUT updates.
#[must_use]
pub fn detect_action(method: &str, path: &str) -> Option<&'static str> {
    let has_id = path.to_ascii_lowercase().contains("{id}");
    openapi::crud_action(method, has_id, &["PUT"])
}

#[derive(Debug, Clone)]
pub struct PipedriveAdapter {
    product: ProductDefinition,
    spec_url: String,
}

impl PipedriveAdapter {
    #[must_use]
    pub fn new(product: ProductDefinition) -> Self {
        Self {
            product,
            spec_url: PIPEDRIVE_SPEC_URL.to_string(),
        }
    }

    /// Fetch the spec from somewhere else (mirrors, tests).
    #[must_use]
    pub fn with_spec_url(mut self, spec_url: impl Into<String>) -> Self {
        self.spec_url = spec_url.into();
        self
    }
}

#[async_trait]
impl ProductAdapter for PipedriveAdapter {
    fn product_id(&self) -> &'static str {
        "pipedrive"
    }

    fn product(&self) -> &ProductDefinition {
        &self.product
    }

    fn spec_url(&self) -> &str {
        &self.spec_url
    }

    #[instrument(skip(self, http), fields(product_id = %self.product.product_id))]
    async fn discover_spec(&self, http: &Client) -> Result<Value, AdapterError> {
        openapi::fetch_spec(http, &self.spec_url, SPEC_TIMEOUT, VENDOR).await
    }

    fn extract_capabilities(&self, spec: &Value) -> Vec<Capability> {
        openapi::extract_capabilities(spec, &self.product.product_id, &RULES)
    }

    fn build_auth_headers(&self, credentials: &Credentials) -> Result<HeaderMap, AdapterError> {
        if !credentials.contains(API_TOKEN) {
            return Err(AdapterError::MissingCredential {
                vendor: VENDOR,
                key: API_TOKEN,
            });
        }
        Ok(HeaderMap::new())
    }
}
