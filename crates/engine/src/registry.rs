//! Caller-owned registry of product definitions.

use std::collections::BTreeMap;

use thiserror::Error;
use toolkit_engine_core::ProductDefinition;
use tracing::{info, warn};
use url::Url;

use crate::config::ConfigError;
use crate::store::ConfigStore;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Product '{0}' not found in registry. Register it first with 'toolkit-engine register'.")]
    ProductNotFound(String),

    #[error("Invalid API base URL for '{product_id}': {reason}")]
    InvalidBaseUrl { product_id: String, reason: String },

    #[error("Product id must not be empty")]
    EmptyProductId,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Products known to this process, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ProductRegistry {
    products: BTreeMap<String, ProductDefinition>,
}

impl ProductRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every product saved in `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if a saved product cannot be read or is invalid.
    pub async fn load(store: &ConfigStore) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for product_id in store.list_product_ids().await? {
            let product = store.load_product(&product_id).await?;
            registry.register(product)?;
        }
        Ok(registry)
    }

    /// Add a product, replacing any previous definition with the same id.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty or the base URL is not an
    /// absolute http(s) URL.
    pub fn register(&mut self, product: ProductDefinition) -> Result<&ProductDefinition, RegistryError> {
        if product.product_id.trim().is_empty() {
            return Err(RegistryError::EmptyProductId);
        }
        validate_base_url(&product)?;

        if self.products.contains_key(&product.product_id) {
            warn!(product_id = %product.product_id, "Product already registered; overwriting");
        }
        info!(
            product_id = %product.product_id,
            name = %product.name,
            "Registered product"
        );

        let product_id = product.product_id.clone();
        self.products.insert(product_id.clone(), product);
        self.get(&product_id)
    }

    /// # Errors
    ///
    /// Returns [`RegistryError::ProductNotFound`] for unknown ids.
    pub fn get(&self, product_id: &str) -> Result<&ProductDefinition, RegistryError> {
        self.products
            .get(product_id)
            .ok_or_else(|| RegistryError::ProductNotFound(product_id.to_string()))
    }

    /// Every product, sorted by id.
    pub fn list(&self) -> impl Iterator<Item = &ProductDefinition> {
        self.products.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

fn validate_base_url(product: &ProductDefinition) -> Result<(), RegistryError> {
    let invalid = |reason: String| RegistryError::InvalidBaseUrl {
        product_id: product.product_id.clone(),
        reason,
    };

    let url = Url::parse(&product.api_base_url).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(()),
        "http" | "https" => Err(invalid("missing host".to_string())),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use toolkit_engine_core::{AuthMethod, ProductType};

    use super::*;

    fn product(id: &str, base_url: &str) -> ProductDefinition {
        ProductDefinition::new(id, id.to_uppercase(), ProductType::Crm, base_url, AuthMethod::Oauth2)
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = ProductRegistry::new();
        registry
            .register(product("hubspot", "https://api.hubapi.com"))
            .unwrap();

        let found = registry.get("hubspot").unwrap();
        assert_eq!(found.name, "HUBSPOT");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_overwrites() {
        let mut registry = ProductRegistry::new();
        registry
            .register(product("hubspot", "https://old.example.com"))
            .unwrap();
        let replaced = registry
            .register(product("hubspot", "https://new.example.com"))
            .unwrap();
        assert_eq!(replaced.api_base_url, "https://new.example.com");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_unknown_product() {
        let registry = ProductRegistry::new();
        let err = registry.get("salesforce").unwrap_err();
        assert!(matches!(err, RegistryError::ProductNotFound(ref id) if id == "salesforce"));
        assert!(err.to_string().contains("toolkit-engine register"));
    }

    #[test]
    fn test_list_sorted_by_id() {
        let mut registry = ProductRegistry::new();
        for id in ["zoho", "hubspot", "pipedrive"] {
            registry.register(product(id, "https://example.com")).unwrap();
        }
        let ids: Vec<_> = registry.list().map(|p| p.product_id.as_str()).collect();
        assert_eq!(ids, vec!["hubspot", "pipedrive", "zoho"]);
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let mut registry = ProductRegistry::new();
        assert!(matches!(
            registry.register(product("a", "not a url")),
            Err(RegistryError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            registry.register(product("b", "ftp://files.example.com")),
            Err(RegistryError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            registry.register(product("", "https://example.com")),
            Err(RegistryError::EmptyProductId)
        ));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_load_from_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        store
            .save_product(&product("pipedrive", "https://api.pipedrive.com/v1"))
            .await
            .unwrap();

        let registry = ProductRegistry::load(&store).await.unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.get("pipedrive").is_ok());
    }
}
