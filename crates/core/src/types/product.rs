//! Product definitions for registered third-party APIs.

use serde::{Deserialize, Serialize};

/// Kind of product being integrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    /// Customer relationship management (`HubSpot`, Pipedrive).
    Crm,
    /// Accounting products.
    Accounting,
}

impl std::fmt::Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Crm => write!(f, "crm"),
            Self::Accounting => write!(f, "accounting"),
        }
    }
}

impl std::str::FromStr for ProductType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "crm" => Ok(Self::Crm),
            "accounting" => Ok(Self::Accounting),
            _ => Err(format!(
                "invalid product type '{s}', must be 'crm' or 'accounting'"
            )),
        }
    }
}

/// How requests to the product's API are authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// Static API key or token.
    ApiKey,
    /// OAuth 2.0 access token.
    Oauth2,
}

impl AuthMethod {
    /// Name of the credential entry this auth method expects.
    ///
    /// API-key products authenticate with `api_token`, OAuth products with
    /// `access_token`.
    #[must_use]
    pub const fn credential_key(self) -> &'static str {
        match self {
            Self::ApiKey => "api_token",
            Self::Oauth2 => "access_token",
        }
    }

    /// Metadata recorded for a freshly registered product.
    #[must_use]
    pub fn default_metadata(self) -> serde_json::Map<String, serde_json::Value> {
        let value = match self {
            Self::ApiKey => serde_json::json!({
                "api_key_header": "Authorization",
                "api_key_prefix": "Bearer ",
            }),
            Self::Oauth2 => serde_json::json!({
                "token_url": "",
                "scopes": [],
            }),
        };
        match value {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        }
    }
}

impl std::fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey => write!(f, "api_key"),
            Self::Oauth2 => write!(f, "oauth2"),
        }
    }
}

impl std::str::FromStr for AuthMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "api_key" => Ok(Self::ApiKey),
            "oauth2" => Ok(Self::Oauth2),
            _ => Err(format!(
                "invalid auth method '{s}', must be 'api_key' or 'oauth2'"
            )),
        }
    }
}

/// A registered product and the details needed to call its API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDefinition {
    /// Internal key (e.g. `hubspot`).
    pub product_id: String,
    /// Human-readable name.
    pub name: String,
    /// Product category.
    #[serde(rename = "type")]
    pub product_type: ProductType,
    /// Base URL every endpoint path is joined onto.
    pub api_base_url: String,
    /// Authentication scheme.
    pub auth_method: AuthMethod,
    /// Free-form auth details (header names, token URLs, scopes).
    #[serde(default)]
    pub auth_metadata: serde_json::Map<String, serde_json::Value>,
}

impl ProductDefinition {
    /// Create a definition with the default metadata for its auth method.
    #[must_use]
    pub fn new(
        product_id: impl Into<String>,
        name: impl Into<String>,
        product_type: ProductType,
        api_base_url: impl Into<String>,
        auth_method: AuthMethod,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            product_type,
            api_base_url: api_base_url.into(),
            auth_method,
            auth_metadata: auth_method.default_metadata(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_type_round_trip_strings() {
        assert_eq!("crm".parse::<ProductType>().unwrap(), ProductType::Crm);
        assert_eq!(ProductType::Accounting.to_string(), "accounting");
        assert!("erp".parse::<ProductType>().is_err());
    }

    #[test]
    fn test_auth_method_credential_key() {
        assert_eq!(AuthMethod::ApiKey.credential_key(), "api_token");
        assert_eq!(AuthMethod::Oauth2.credential_key(), "access_token");
    }

    #[test]
    fn test_default_metadata() {
        let api_key = AuthMethod::ApiKey.default_metadata();
        assert_eq!(api_key["api_key_header"], "Authorization");
        assert_eq!(api_key["api_key_prefix"], "Bearer ");

        let oauth = AuthMethod::Oauth2.default_metadata();
        assert_eq!(oauth["token_url"], "");
        assert!(oauth["scopes"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_definition_serializes_type_field() {
        let product = ProductDefinition::new(
            "hubspot",
            "HubSpot",
            ProductType::Crm,
            "https://api.hubapi.com",
            AuthMethod::Oauth2,
        );
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["type"], "crm");
        assert_eq!(json["auth_method"], "oauth2");

        let parsed: ProductDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, product);
    }

    #[test]
    fn test_definition_missing_metadata_defaults_empty() {
        let json = serde_json::json!({
            "product_id": "pipedrive",
            "name": "Pipedrive",
            "type": "crm",
            "api_base_url": "https://api.pipedrive.com/v1",
            "auth_method": "api_key",
        });
        let parsed: ProductDefinition = serde_json::from_value(json).unwrap();
        assert!(parsed.auth_metadata.is_empty());
    }

    #[test]
    fn test_definition_rejects_unknown_auth() {
        let json = serde_json::json!({
            "product_id": "x",
            "name": "X",
            "type": "crm",
            "api_base_url": "https://x",
            "auth_method": "basic",
        });
        assert!(serde_json::from_value::<ProductDefinition>(json).is_err());
    }
}
