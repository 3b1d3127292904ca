//! Vendor adapters.
//!
//! Each supported product gets one [`ProductAdapter`] that knows where its
//! OpenAPI document lives, how to turn that document into [`Capability`]
//! records, and how to authenticate requests.

mod error;
mod hubspot;
mod openapi;
mod pipedrive;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde_json::Value;
use toolkit_engine_core::{Capability, ProductDefinition};

pub use error::AdapterError;
pub use hubspot::{HUBSPOT_SPEC_URL, HubSpotAdapter};
pub use pipedrive::{PIPEDRIVE_SPEC_URL, PipedriveAdapter};

use crate::client::Credentials;

/// Product ids with a built-in adapter.
pub const SUPPORTED_PRODUCTS: &[&str] = &["hubspot", "pipedrive"];

/// Per-vendor discovery and authentication.
#[async_trait]
pub trait ProductAdapter: Send + Sync + std::fmt::Debug {
    /// Adapter key (`hubspot`, `pipedrive`).
    fn product_id(&self) -> &'static str;

    /// The registered product this adapter serves.
    fn product(&self) -> &ProductDefinition;

    /// Where [`discover_spec`](Self::discover_spec) fetches from.
    fn spec_url(&self) -> &str;

    /// Fetch the vendor's API description.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be fetched or parsed.
    async fn discover_spec(&self, http: &Client) -> Result<Value, AdapterError>;

    /// Unscored capabilities in document order.
    fn extract_capabilities(&self, spec: &Value) -> Vec<Capability>;

    /// Headers that authenticate a request.
    ///
    /// # Errors
    ///
    /// Returns an error if a required credential is missing or malformed.
    fn build_auth_headers(&self, credentials: &Credentials) -> Result<HeaderMap, AdapterError>;
}

/// Pick the adapter for a product, matching its id case-insensitively.
///
/// # Errors
///
/// Returns [`AdapterError::NotFound`] for unsupported products.
pub fn adapter_for_product(
    product: &ProductDefinition,
) -> Result<Box<dyn ProductAdapter>, AdapterError> {
    match product.product_id.to_ascii_lowercase().as_str() {
        "hubspot" => Ok(Box::new(HubSpotAdapter::new(product.clone()))),
        "pipedrive" => Ok(Box::new(PipedriveAdapter::new(product.clone()))),
        _ => Err(AdapterError::NotFound {
            product_id: product.product_id.clone(),
            supported: SUPPORTED_PRODUCTS.join(", "),
        }),
    }
}
