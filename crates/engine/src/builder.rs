//! Assemble a ready-to-use [`CrmClient`] from persisted configuration.

use thiserror::Error;
use toolkit_engine_core::ProductDefinition;
use tracing::{info, instrument};

use crate::adapters::{AdapterError, adapter_for_product};
use crate::client::{ApiError, ClientOptions, CrmClient, Credentials};
use crate::config::ConfigError;
use crate::registry::ProductRegistry;
use crate::store::ConfigStore;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Product '{0}' not found. Register it first with 'toolkit-engine register'.")]
    ProductNotFound(String),

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Find a product in the registry, falling back to the store.
///
/// # Errors
///
/// Returns [`BuildError::ProductNotFound`] when neither has it, or the
/// store error when the saved definition is unreadable.
pub async fn resolve_product(
    registry: &ProductRegistry,
    store: &ConfigStore,
    product_id: &str,
) -> Result<ProductDefinition, BuildError> {
    if let Ok(product) = registry.get(product_id) {
        return Ok(product.clone());
    }
    match store.load_product(product_id).await {
        Ok(product) => Ok(product),
        Err(ConfigError::NotFound { .. }) => Err(BuildError::ProductNotFound(product_id.to_string())),
        Err(err) => Err(err.into()),
    }
}

/// Build a client for `product_id` from its definition and saved mapping.
///
/// # Errors
///
/// Returns an error if the product is unknown or unsupported, the mapping
/// has not been selected yet, or the transport cannot be built.
#[instrument(skip(registry, store, credentials, options))]
pub async fn generate_integration(
    registry: &ProductRegistry,
    store: &ConfigStore,
    product_id: &str,
    credentials: Credentials,
    options: ClientOptions,
) -> Result<CrmClient, BuildError> {
    let product = resolve_product(registry, store, product_id).await?;
    let adapter = adapter_for_product(&product)?;
    let mapping = store.load_mapping(product_id).await?;

    info!(
        endpoints = mapping.endpoint_count(),
        entities = mapping.entity_count(),
        "Loaded endpoint mapping"
    );

    Ok(CrmClient::new(product, mapping, adapter, credentials, options)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use toolkit_engine_core::{AuthMethod, Endpoint, EndpointMapping, ProductType};

    use super::*;

    fn product(id: &str) -> ProductDefinition {
        ProductDefinition::new(id, id, ProductType::Crm, "https://api.example.com", AuthMethod::Oauth2)
    }

    #[tokio::test]
    async fn test_generate_integration_from_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        store.save_product(&product("hubspot")).await.unwrap();
        let mut mapping = EndpointMapping::new();
        mapping.insert("contacts", "list", Endpoint::new("GET", "/crm/v3/objects/contacts"));
        store.save_mapping("hubspot", &mapping).await.unwrap();

        let client = generate_integration(
            &ProductRegistry::new(),
            &store,
            "hubspot",
            Credentials::single("access_token", "t"),
            ClientOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(client.product().product_id, "hubspot");
        assert_eq!(client.mapping(), &mapping);
        assert!(client.owns_transport());
    }

    #[tokio::test]
    async fn test_generate_integration_prefers_registry() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        store.save_mapping("hubspot", &EndpointMapping::new()).await.unwrap();
        let mut registry = ProductRegistry::new();
        registry.register(product("hubspot")).unwrap();

        let client = generate_integration(
            &registry,
            &store,
            "hubspot",
            Credentials::new(),
            ClientOptions::default().with_http_client(reqwest::Client::new()),
        )
        .await
        .unwrap();
        assert!(!client.owns_transport());
    }

    #[tokio::test]
    async fn test_missing_product() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        let err = generate_integration(
            &ProductRegistry::new(),
            &store,
            "hubspot",
            Credentials::new(),
            ClientOptions::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BuildError::ProductNotFound(_)));
        assert!(err.to_string().contains("toolkit-engine register"));
    }

    #[tokio::test]
    async fn test_missing_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        store.save_product(&product("pipedrive")).await.unwrap();

        let err = generate_integration(
            &ProductRegistry::new(),
            &store,
            "pipedrive",
            Credentials::new(),
            ClientOptions::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BuildError::Config(ConfigError::NotFound { .. })));
        assert!(err.to_string().contains("toolkit-engine select --id pipedrive"));
    }

    #[tokio::test]
    async fn test_unsupported_product() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        store.save_product(&product("xero")).await.unwrap();

        let err = generate_integration(
            &ProductRegistry::new(),
            &store,
            "xero",
            Credentials::new(),
            ClientOptions::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BuildError::Adapter(AdapterError::NotFound { .. })));
    }
}
