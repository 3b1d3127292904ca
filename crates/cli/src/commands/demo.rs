//! `demo-client` and `demo-full` - exercise the generated client.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use toolkit_engine::builder::resolve_product;
use toolkit_engine::demo::{DemoError, run_demo, summarize_contact};
use toolkit_engine::{
    BuildError, ClientError, ConfigError, ConfigStore, Credentials, ProductRegistry,
    generate_integration,
};

#[derive(Debug, Error)]
pub enum DemoCommandError {
    #[error("No credentials provided. Use --credentials 'access_token=YOUR_TOKEN' or similar.")]
    NoCredentials,

    #[error(
        "No token provided. Use --token or set {prefix}_API_TOKEN or {prefix}_ACCESS_TOKEN."
    )]
    NoToken { prefix: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Demo(#[from] DemoError),
}

/// Token from the flag, else `<ID>_API_TOKEN`, else `<ID>_ACCESS_TOKEN`.
fn resolve_token(
    product_id: &str,
    flag: Option<String>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, DemoCommandError> {
    let prefix = product_id.to_uppercase();
    flag.or_else(|| lookup(&format!("{prefix}_API_TOKEN")))
        .or_else(|| lookup(&format!("{prefix}_ACCESS_TOKEN")))
        .filter(|token| !token.is_empty())
        .map(SecretString::from)
        .ok_or(DemoCommandError::NoToken { prefix })
}

/// Credential name for the product's auth method.
async fn credential_key(
    registry: &ProductRegistry,
    store: &ConfigStore,
    product_id: &str,
) -> Result<&'static str, DemoCommandError> {
    let product = resolve_product(registry, store, product_id).await?;
    Ok(product.auth_method.credential_key())
}

/// List contacts and print up to three of them.
#[allow(clippy::print_stdout)]
pub async fn client(product_id: &str, credentials: &str) -> Result<(), DemoCommandError> {
    let credentials = Credentials::parse_pairs(credentials);
    if credentials.is_empty() {
        return Err(DemoCommandError::NoCredentials);
    }

    let (config, store) = super::context()?;

    println!("Generating CRM client for '{product_id}'...");
    let mut client = generate_integration(
        &ProductRegistry::new(),
        &store,
        product_id,
        credentials,
        config.client_options(),
    )
    .await?;
    println!("Client created successfully!");
    println!();

    println!("Fetching contacts...");
    let contacts = client.list_contacts(None).await;
    client.close();
    let contacts = contacts?;

    println!("Retrieved {} contacts", contacts.len());
    if !contacts.is_empty() {
        println!();
        println!("Sample contacts:");
        for contact in contacts.iter().take(3) {
            let summary = summarize_contact(contact);
            println!("  - ID: {}", summary.id.as_deref().unwrap_or("unknown"));
            if let Some(name) = summary.name {
                println!("    Name: {name}");
            }
            if let Some(email) = summary.email {
                println!("    Email: {email}");
            }
        }
    }
    println!();
    println!("Demo complete!");
    Ok(())
}

/// Run the end-to-end workflow.
#[allow(clippy::print_stdout)]
pub async fn full(product_id: &str, token: Option<String>) -> Result<(), DemoCommandError> {
    let token = resolve_token(product_id, token, |key| std::env::var(key).ok())?;
    let (config, store) = super::context()?;
    let registry = ProductRegistry::new();

    let key = credential_key(&registry, &store, product_id).await?;
    let credentials = Credentials::single(key, token.expose_secret());

    println!("Starting demo for '{product_id}'...");
    println!();

    let http = reqwest::Client::new();
    let report = run_demo(
        &registry,
        &store,
        &http,
        product_id,
        credentials,
        config.client_options(),
    )
    .await?;

    println!("Product: {} ({})", report.product.name, report.product.product_type);
    println!("  Auth:     {}", report.product.auth_method);
    println!("  Base URL: {}", report.product.api_base_url);
    if let Some(count) = report.discovered {
        println!("Discovered {count} capabilities");
    }
    println!("Retrieved {} contacts", report.contacts_fetched);
    if let Some(sample) = &report.sample {
        let mut line = format!("  Sample: ID={}", sample.id.as_deref().unwrap_or("unknown"));
        if let Some(name) = &sample.name {
            line.push_str(&format!(", Name={name}"));
        }
        if let Some(email) = &sample.email {
            line.push_str(&format!(", Email={email}"));
        }
        println!("{line}");
    }
    if report.get_contact_ok {
        println!("get_contact() working");
    }
    println!();
    println!("Demo completed successfully!");
    Ok(())
}
