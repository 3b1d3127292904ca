//! `list` - show every saved product.

use toolkit_engine::{ProductRegistry, RegistryError};

#[allow(clippy::print_stdout)]
pub async fn run() -> Result<(), RegistryError> {
    let (_config, store) = super::context()?;
    let registry = ProductRegistry::load(&store).await?;

    if registry.is_empty() {
        println!("No products registered.");
        return Ok(());
    }

    println!("Registered products ({}):", registry.len());
    println!();
    for product in registry.list() {
        println!("  ID:       {}", product.product_id);
        println!("  Name:     {}", product.name);
        println!("  Type:     {}", product.product_type);
        println!("  Base URL: {}", product.api_base_url);
        println!("  Auth:     {}", product.auth_method);
        println!();
    }
    Ok(())
}
