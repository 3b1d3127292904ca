//! Core types for the toolkit engine.
//!
//! This module provides typed records for the data that flows between
//! discovery, selection and the uniform client.

pub mod capability;
pub mod entity;
pub mod mapping;
pub mod product;

pub use capability::{Capability, UNKNOWN};
pub use entity::{CrudAction, EntityKind};
pub use mapping::{Endpoint, EndpointMapping, Selections};
pub use product::{AuthMethod, ProductDefinition, ProductType};
