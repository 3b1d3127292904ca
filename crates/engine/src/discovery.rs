//! Capability discovery: fetch a product's spec, extract capabilities and
//! persist both.

use reqwest::Client;
use thiserror::Error;
use toolkit_engine_core::Capability;
use tracing::{info, instrument};

use crate::adapters::{AdapterError, ProductAdapter, adapter_for_product};
use crate::config::ConfigError;
use crate::registry::{ProductRegistry, RegistryError};
use crate::store::ConfigStore;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Discover capabilities for a registered product.
///
/// Writes `<id>_raw_spec.json` and `<id>_capabilities.json`.
///
/// # Errors
///
/// Returns an error if the product is unknown, has no adapter, the spec
/// cannot be fetched, or the results cannot be saved.
#[instrument(skip(registry, store, http))]
pub async fn discover_capabilities(
    registry: &ProductRegistry,
    store: &ConfigStore,
    http: &Client,
    product_id: &str,
) -> Result<Vec<Capability>, DiscoveryError> {
    let product = registry.get(product_id)?;
    info!(
        name = %product.name,
        product_type = %product.product_type,
        auth_method = %product.auth_method,
        "Starting capability discovery"
    );

    let adapter = adapter_for_product(product)?;
    discover_with_adapter(adapter.as_ref(), store, http).await
}

/// Discovery with an already chosen adapter.
///
/// # Errors
///
/// See [`discover_capabilities`].
#[instrument(skip_all, fields(adapter = adapter.product_id(), spec_url = adapter.spec_url()))]
pub async fn discover_with_adapter(
    adapter: &dyn ProductAdapter,
    store: &ConfigStore,
    http: &Client,
) -> Result<Vec<Capability>, DiscoveryError> {
    let product_id = &adapter.product().product_id;

    let spec = adapter.discover_spec(http).await?;
    let spec_path = store.save_raw_spec(product_id, &spec).await?;
    info!(path = %spec_path.display(), "Saved raw spec");

    let capabilities = adapter.extract_capabilities(&spec);

    let capabilities_path = store.save_capabilities(product_id, &capabilities).await?;
    info!(
        count = capabilities.len(),
        path = %capabilities_path.display(),
        "Saved capabilities"
    );

    Ok(capabilities)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use toolkit_engine_core::{AuthMethod, ProductDefinition, ProductType};

    use super::*;
    use crate::adapters::{HubSpotAdapter, PipedriveAdapter};
    use crate::store::{CAPABILITIES_SUFFIX, RAW_SPEC_SUFFIX};

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}")
    }

    fn product(id: &str) -> ProductDefinition {
        ProductDefinition::new(id, id, ProductType::Crm, "https://example.com", AuthMethod::ApiKey)
    }

    #[tokio::test]
    async fn test_discovery_persists_spec_and_capabilities() {
        let app = Router::new().route(
            "/openapi.json",
            get(|| async {
                Json(json!({
                    "paths": {
                        "/v1/persons": { "get": {}, "post": {} },
                        "/v1/persons/{id}": { "get": {}, "put": {} }
                    }
                }))
            }),
        );
        let base = spawn(app).await;
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        let adapter = PipedriveAdapter::new(product("pipedrive"))
            .with_spec_url(format!("{base}/openapi.json"));

        let caps = discover_with_adapter(&adapter, &store, &Client::new())
            .await
            .unwrap();

        assert_eq!(caps.len(), 4);
        assert!(store.exists("pipedrive", RAW_SPEC_SUFFIX).await);
        assert!(store.exists("pipedrive", CAPABILITIES_SUFFIX).await);
        assert_eq!(store.load_capabilities("pipedrive").await.unwrap(), caps);
    }

    #[tokio::test]
    async fn test_discovery_http_failure() {
        let app = Router::new().route("/spec", get(|| async { StatusCode::SERVICE_UNAVAILABLE }));
        let base = spawn(app).await;
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        let adapter = HubSpotAdapter::new(product("hubspot")).with_spec_url(format!("{base}/spec"));

        let err = discover_with_adapter(&adapter, &store, &Client::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DiscoveryError::Adapter(AdapterError::HttpStatus { status: 503, .. })
        ));
        assert!(!store.exists("hubspot", RAW_SPEC_SUFFIX).await);
    }

    #[tokio::test]
    async fn test_discovery_invalid_json() {
        let app = Router::new().route("/spec", get(|| async { "<html>nope</html>" }));
        let base = spawn(app).await;
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        let adapter = HubSpotAdapter::new(product("hubspot")).with_spec_url(format!("{base}/spec"));

        let err = discover_with_adapter(&adapter, &store, &Client::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::Adapter(AdapterError::InvalidSpec { .. })));
    }

    #[tokio::test]
    async fn test_discover_unknown_product() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        let err = discover_capabilities(&ProductRegistry::new(), &store, &Client::new(), "hubspot")
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::Registry(RegistryError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_discover_unsupported_product() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        let mut registry = ProductRegistry::new();
        registry.register(product("salesforce")).unwrap();

        let err = discover_capabilities(&registry, &store, &Client::new(), "salesforce")
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::Adapter(AdapterError::NotFound { .. })));
    }
}
