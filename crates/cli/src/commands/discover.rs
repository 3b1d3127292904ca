//! `discover` - fetch a product's spec and summarize its capabilities.

use std::collections::BTreeMap;

use toolkit_engine::{DiscoveryError, ProductRegistry, discover_capabilities};
use toolkit_engine_core::Capability;

/// Capabilities per entity, with the first endpoint seen for each action.
fn breakdown(capabilities: &[Capability]) -> BTreeMap<&str, (usize, BTreeMap<&str, &Capability>)> {
    let mut entities: BTreeMap<&str, (usize, BTreeMap<&str, &Capability>)> = BTreeMap::new();
    for cap in capabilities {
        let (count, actions) = entities.entry(cap.entity_key()).or_default();
        *count += 1;
        actions.entry(cap.action_key()).or_insert(cap);
    }
    entities
}

#[allow(clippy::print_stdout)]
pub async fn run(product_id: &str) -> Result<(), DiscoveryError> {
    let (_config, store) = super::context()?;

    let mut registry = ProductRegistry::new();
    let product = store.load_product(product_id).await?;
    println!("Loaded product: {}", product.name);
    registry.register(product)?;

    println!("Discovering API capabilities for '{product_id}'...");
    println!();

    let http = reqwest::Client::new();
    let capabilities = discover_capabilities(&registry, &store, &http, product_id).await?;

    println!("Discovery complete!");
    println!();
    println!("Total capabilities discovered: {}", capabilities.len());
    println!();
    println!("Capabilities by entity:");
    println!();
    for (entity, (count, actions)) in breakdown(&capabilities) {
        println!("  {entity} ({count} capabilities)");
        for (action, cap) in actions {
            println!("    - {action:8} {:6} {}", cap.http_method, cap.path);
        }
        println!();
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_breakdown_counts_and_samples() {
        let caps = vec![
            Capability::new("p", "contacts", "list", "GET", "/contacts"),
            Capability::new("p", "contacts", "list", "GET", "/contacts/search"),
            Capability::new("p", "contacts", "get", "GET", "/contacts/{id}"),
            Capability::new("p", "deals", "list", "GET", "/deals"),
        ];
        let summary = breakdown(&caps);

        let (count, actions) = summary.get("contacts").unwrap();
        assert_eq!(*count, 3);
        assert_eq!(actions.get("list").unwrap().path, "/contacts");
        assert_eq!(summary.keys().copied().collect::<Vec<_>>(), vec!["contacts", "deals"]);
    }
}
