//! End-to-end walkthrough: product, capabilities, mapping, client, calls.

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use toolkit_engine_core::ProductDefinition;
use tracing::{debug, info, instrument, warn};

use crate::builder::{BuildError, generate_integration, resolve_product};
use crate::client::{ClientError, ClientOptions, Credentials};
use crate::config::ConfigError;
use crate::discovery::{DiscoveryError, discover_capabilities};
use crate::registry::{ProductRegistry, RegistryError};
use crate::store::{CAPABILITIES_SUFFIX, ConfigStore, MAPPING_SUFFIX};

#[derive(Debug, Error)]
pub enum DemoError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("Could not discover capabilities: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error(
        "No mapping found for '{0}'. Run 'toolkit-engine select --id {0}' to create it."
    )]
    MissingMapping(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Identifying fields pulled out of a contact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactSummary {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// What the demo did.
#[derive(Debug, Clone, Serialize)]
pub struct DemoReport {
    pub product: ProductDefinition,
    /// Set when capabilities had to be discovered during the run.
    pub discovered: Option<usize>,
    pub contacts_fetched: usize,
    pub sample: Option<ContactSummary>,
    /// Whether fetching the sample contact by id worked.
    pub get_contact_ok: bool,
}

/// Non-empty string form of a scalar JSON value.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn first_text(record: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| text(record.get(*key)))
}

/// Extract id, name and email from a HubSpot (`properties`) or Pipedrive
/// (flat, email as a list of `{value}` objects) contact.
#[must_use]
pub fn summarize_contact(contact: &Value) -> ContactSummary {
    let id = first_text(contact, &["id", "vid", "contact_id"]);

    if let Some(props) = contact.get("properties") {
        let first = first_text(props, &["firstname", "first_name", "firstName"]);
        let last = first_text(props, &["lastname", "last_name", "lastName"]);
        let name = match (first, last) {
            (None, None) => None,
            (first, last) => Some(
                format!("{} {}", first.unwrap_or_default(), last.unwrap_or_default())
                    .trim()
                    .to_string(),
            ),
        };
        return ContactSummary {
            id,
            name,
            email: first_text(props, &["email", "e_mail"]),
        };
    }

    let email = match contact.get("email").or_else(|| contact.get("primary_email")) {
        Some(Value::Array(entries)) => entries.first().and_then(|entry| match entry {
            Value::Object(_) => text(entry.get("value")),
            other => text(Some(other)),
        }),
        other => text(other),
    };

    ContactSummary {
        id,
        name: first_text(contact, &["name"]),
        email,
    }
}

/// Run the whole workflow for `product_id`.
///
/// Discovers capabilities when none are saved, but never selects endpoints:
/// a missing mapping is an error telling the caller to run `select`.
///
/// # Errors
///
/// Returns the first failing step's error. The client is released on every
/// path.
#[instrument(skip(registry, store, http, credentials, options))]
pub async fn run_demo(
    registry: &ProductRegistry,
    store: &ConfigStore,
    http: &Client,
    product_id: &str,
    credentials: Credentials,
    options: ClientOptions,
) -> Result<DemoReport, DemoError> {
    let product = resolve_product(registry, store, product_id).await?;
    info!(name = %product.name, base_url = %product.api_base_url, "Loaded product");

    let discovered = if store.exists(product_id, CAPABILITIES_SUFFIX).await {
        info!("Capabilities file exists");
        None
    } else {
        info!("Capabilities file missing; running discovery");
        let mut scoped = registry.clone();
        scoped.register(product.clone())?;
        let capabilities = discover_capabilities(&scoped, store, http, product_id).await?;
        Some(capabilities.len())
    };

    if !store.exists(product_id, MAPPING_SUFFIX).await {
        return Err(DemoError::MissingMapping(product_id.to_string()));
    }

    let mut client = generate_integration(registry, store, product_id, credentials, options).await?;
    let calls = async {
        let contacts = client.list_contacts(None).await?;
        info!(count = contacts.len(), "Fetched contacts");

        let sample = contacts.first().map(summarize_contact);
        let mut get_contact_ok = false;
        if let Some(id) = sample.as_ref().and_then(|s| s.id.as_deref()) {
            match client.get_contact(id).await {
                Ok(_) => get_contact_ok = true,
                Err(err) => debug!(error = %err, "get_contact probe failed"),
            }
        }
        Ok::<_, ClientError>((contacts.len(), sample, get_contact_ok))
    }
    .await;
    client.close();

    let (contacts_fetched, sample, get_contact_ok) = calls.inspect_err(|err| {
        warn!(error = %err, status = ?err.status_code(), "Demo API call failed");
    })?;

    Ok(DemoReport {
        product,
        discovered,
        contacts_fetched,
        sample,
        get_contact_ok,
    })
}
