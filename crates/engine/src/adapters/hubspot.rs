//! HubSpot CRM adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;
use toolkit_engine_core::{Capability, ProductDefinition};
use tracing::instrument;

use super::openapi::{self, PathRules};
use super::{AdapterError, ProductAdapter};
use crate::client::{ACCESS_TOKEN, Credentials};

/// Public catalog entry for the CRM v3 OpenAPI document.
pub const HUBSPOT_SPEC_URL: &str = "https://api.hubspot.com/api-catalog-public/v1/apis/crm/v3";

const SPEC_TIMEOUT: Duration = Duration::from_secs(10);
const VENDOR: &str = "HubSpot";

/// Path placeholders that mark a single-record endpoint.
const ID_PLACEHOLDERS: &[&str] = &[
    "{id}",
    "{contactid}",
    "{companyid}",
    "{dealid}",
    "{ticketid}",
    "{productid}",
];

const RULES: PathRules = PathRules {
    vendor: VENDOR,
    methods: &["get", "post", "put", "patch", "delete"],
    detect_entity,
    detect_action,
};

/// Entity for a HubSpot path. Companies are normalized to `organisations`.
#[must_use]
pub fn detect_entity(path: &str) -> Option<&'static str> {
    let path = path.to_ascii_lowercase();
    if path.contains("contacts") {
        Some("contacts")
    } else if path.contains("companies") {
        Some("organisations")
    } else if path.contains("deals") {
        Some("deals")
    } else if path.contains("tickets") {
        Some("tickets")
    } else if path.contains("products") {
        Some("products")
    } else if path.contains("line_items") || path.contains("lineitems") {
        Some("line_items")
    } else if path.contains("quotes") {
        Some("quotes")
    } else {
        None
    }
}

/// Action for an upper-case method and path. PATCH and PUT both update.
#[must_use]
pub fn detect_action(method: &str, path: &str) -> Option<&'static str> {
    let path = path.to_ascii_lowercase();
    let has_id = ID_PLACEHOLDERS.iter().any(|p| path.contains(p));
    openapi::crud_action(method, has_id, &["PATCH", "PUT"])
}

/// HubSpot uses bearer tokens (private app or OAuth access tokens).
#[derive(Debug, Clone)]
pub struct HubSpotAdapter {
    product: ProductDefinition,
    spec_url: String,
}

impl HubSpotAdapter {
    #[must_use]
    pub fn new(product: ProductDefinition) -> Self {
        Self {
            product,
            spec_url: HUBSPOT_SPEC_URL.to_string(),
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
impl ProductAdapter for HubSpotAdapter {
    fn product_id(&self) -> &'static str {
        "hubspot"
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
        let token = credentials
            .expose(ACCESS_TOKEN)
            .ok_or(AdapterError::MissingCredential {
                vendor: VENDOR,
                key: ACCESS_TOKEN,
            })?;

        let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            AdapterError::InvalidCredential {
                vendor: VENDOR,
                key: ACCESS_TOKEN,
            }
        })?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }
}
