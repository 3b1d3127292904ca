//! Toolkit Engine Core - Shared types library.
//!
//! This crate provides the typed records used across the toolkit engine:
//! - `toolkit-engine` - discovery, selection and the uniform CRM client
//! - `toolkit-engine-cli` - the `toolkit-engine` command-line tool
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no file
//! access. Records are validated on deserialization so persisted JSON is
//! checked once at the boundary instead of at every call site.
//!
//! # Modules
//!
//! - [`types`] - Capabilities, endpoint mappings, selections and product definitions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
