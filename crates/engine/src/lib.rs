//! Toolkit Engine library.
//!
//! Discovers the REST surface of third-party CRM products, picks one endpoint
//! per entity and action, and exposes a uniform client over the result.
//!
//! # Workflow
//!
//! 1. [`registry`] / [`store`] - register a product and persist its definition
//! 2. [`discovery`] - fetch the vendor spec through an [`adapters`] entry
//! 3. [`selection`] - score, group, resolve ambiguities, build the mapping
//! 4. [`builder`] - load the mapping and produce a [`client::CrmClient`]
//!
//! [`demo`] runs all of it end to end.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod adapters;
pub mod builder;
pub mod client;
pub mod config;
pub mod demo;
pub mod discovery;
pub mod registry;
pub mod selection;
pub mod store;

pub use builder::{BuildError, generate_integration};
pub use client::{ApiError, ClientError, ClientOptions, CrmClient, Credentials};
pub use config::{ConfigError, EngineConfig};
pub use discovery::{DiscoveryError, discover_capabilities};
pub use registry::{ProductRegistry, RegistryError};
pub use store::ConfigStore;
