//! Toolkit Engine CLI - register, discover and map CRM APIs.
//!
//! # Usage
//!
//! ```bash
//! # Register a product
//! toolkit-engine register --id hubspot --name HubSpot --type crm \
//!     --base-url https://api.hubapi.com --auth oauth2
//!
//! # Discover its capabilities
//! toolkit-engine discover --id hubspot
//!
//! # Pick one endpoint per entity/action
//! toolkit-engine select --id hubspot
//!
//! # Call it through the uniform client
//! toolkit-engine demo-client --id hubspot --credentials 'access_token=...'
//! toolkit-engine demo-full --id hubspot --token ...
//! ```
//!
//! # Environment Variables
//!
//! - `TOOLKIT_ENGINE_HOME` - Storage directory (default: `~/.toolkit_engine`)
//! - `TOOLKIT_REQUEST_TIMEOUT_SECS` - Per-attempt request timeout
//! - `TOOLKIT_MAX_RETRIES` - Attempts per request
//! - `<ID>_API_TOKEN` / `<ID>_ACCESS_TOKEN` - Token for `demo-full`
//! - `RUST_LOG` - Log filter (overrides `--verbose`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use toolkit_engine_core::{AuthMethod, ProductType};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "toolkit-engine")]
#[command(author, version, about = "Toolkit Integration Engine")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new product
    Register {
        /// Internal product id (e.g. hubspot)
        #[arg(long)]
        id: String,

        /// Human-readable name
        #[arg(long)]
        name: String,

        /// Product type (`crm`, `accounting`)
        #[arg(long = "type")]
        product_type: ProductType,

        /// API base URL
        #[arg(long)]
        base_url: String,

        /// Authentication method (`api_key`, `oauth2`)
        #[arg(long)]
        auth: AuthMethod,
    },
    /// List registered products
    List,
    /// Discover API capabilities for a product
    Discover {
        #[arg(long)]
        id: String,
    },
    /// Choose one endpoint per entity/action and save the mapping
    Select {
        #[arg(long)]
        id: String,

        /// Take the best-scored endpoint instead of prompting
        #[arg(long)]
        auto: bool,
    },
    /// List contacts through the generated client
    DemoClient {
        #[arg(long)]
        id: String,

        /// Comma-separated `key=value` pairs, e.g. `access_token=...`
        #[arg(long)]
        credentials: String,
    },
    /// Run the complete workflow end to end
    DemoFull {
        #[arg(long)]
        id: String,

        /// API token (falls back to `<ID>_API_TOKEN` / `<ID>_ACCESS_TOKEN`)
        #[arg(long)]
        token: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Register {
            id,
            name,
            product_type,
            base_url,
            auth,
        } => commands::register::run(&id, &name, product_type, &base_url, auth).await?,
        Commands::List => commands::list::run().await?,
        Commands::Discover { id } => commands::discover::run(&id).await?,
        Commands::Select { id, auto } => commands::select::run(&id, auto).await?,
        Commands::DemoClient { id, credentials } => {
            commands::demo::client(&id, &credentials).await?;
        }
        Commands::DemoFull { id, token } => commands::demo::full(&id, token).await?,
    }
    Ok(())
}
