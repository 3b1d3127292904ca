//! `register` - add a product definition and save it.

use toolkit_engine::{ProductRegistry, RegistryError};
use toolkit_engine_core::{AuthMethod, ProductDefinition, ProductType};

/// Register a product and persist it to `<id>_product.json`.
///
/// Default auth metadata is filled in from the auth method.
#[allow(clippy::print_stdout)]
pub async fn run(
    product_id: &str,
    name: &str,
    product_type: ProductType,
    base_url: &str,
    auth_method: AuthMethod,
) -> Result<(), RegistryError> {
    let (_config, store) = super::context()?;

    let mut registry = ProductRegistry::new();
    let product = registry.register(ProductDefinition::new(
        product_id,
        name,
        product_type,
        base_url,
        auth_method,
    ))?;

    let path = store.save_product(product).await?;

    println!(
        "Successfully registered product '{}' ({})",
        product.product_id, product.name
    );
    println!("Configuration saved to: {}", path.display());
    Ok(())
}
