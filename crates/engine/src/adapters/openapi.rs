//! Shared OpenAPI handling: fetching a spec and walking its `paths` object.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use toolkit_engine_core::Capability;
use tracing::{debug, info};

use super::AdapterError;

/// Vendor heuristics used to turn OpenAPI operations into capabilities.
pub(crate) struct PathRules {
    /// Display name used in errors and logs.
    pub vendor: &'static str,
    /// Lower-case HTTP methods worth inspecting.
    pub methods: &'static [&'static str],
    /// Map a path to a normalized entity.
    pub detect_entity: fn(&str) -> Option<&'static str>,
    /// Map an upper-case method and path to a normalized action.
    pub detect_action: fn(&str, &str) -> Option<&'static str>,
}

/// Download a spec document and parse it as JSON.
pub(crate) async fn fetch_spec(
    http: &Client,
    url: &str,
    timeout: Duration,
    vendor: &'static str,
) -> Result<Value, AdapterError> {
    info!(vendor, url, "Discovering API spec");

    let response = http
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| AdapterError::Connection {
            vendor,
            message: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(AdapterError::HttpStatus {
            vendor,
            status: status.as_u16(),
        });
    }

    let bytes = response.bytes().await.map_err(|e| AdapterError::Connection {
        vendor,
        message: e.to_string(),
    })?;

    let spec = serde_json::from_slice(&bytes).map_err(|e| AdapterError::InvalidSpec {
        vendor,
        message: e.to_string(),
    })?;

    info!(vendor, "Retrieved API spec");
    Ok(spec)
}

/// Walk `spec.paths` in document order and emit one capability per
/// recognised `(path, method)` pair.
pub(crate) fn extract_capabilities(
    spec: &Value,
    product_id: &str,
    rules: &PathRules,
) -> Vec<Capability> {
    let Some(paths) = spec.get("paths").and_then(Value::as_object) else {
        debug!(vendor = rules.vendor, "Spec has no paths object");
        return Vec::new();
    };

    debug!(vendor = rules.vendor, paths = paths.len(), "Walking spec paths");

    let mut capabilities = Vec::new();
    for (path, operations) in paths {
        let Some(operations) = operations.as_object() else {
            continue;
        };
        let Some(entity) = (rules.detect_entity)(path) else {
            continue;
        };

        for method in operations.keys() {
            if !rules
                .methods
                .iter()
                .any(|allowed| method.eq_ignore_ascii_case(allowed))
            {
                continue;
            }
            let method = method.to_ascii_uppercase();
            let Some(action) = (rules.detect_action)(&method, path) else {
                continue;
            };

            debug!(entity, action, method = %method, path = %path, "Extracted capability");
            capabilities.push(Capability::new(product_id, entity, action, method, path.as_str()));
        }
    }

    info!(
        vendor = rules.vendor,
        count = capabilities.len(),
        "Extracted capabilities from spec"
    );
    capabilities
}

/// Action for a CRUD-shaped REST path.
///
/// `update_methods` lists the verbs the vendor uses for updates.
pub(crate) fn crud_action(
    method: &str,
    has_id: bool,
    update_methods: &[&str],
) -> Option<&'static str> {
    match (method, has_id) {
        ("GET", true) => Some("get"),
        ("GET", false) => Some("list"),
        ("POST", false) => Some("create"),
        ("DELETE", true) => Some("delete"),
        (m, true) if update_methods.contains(&m) => Some("update"),
        _ => None,
    }
}
