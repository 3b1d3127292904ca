//! Adapter error types.

use thiserror::Error;

/// Errors raised while picking an adapter, fetching a spec or building auth.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// No adapter handles this product id.
    #[error("No adapter available for product '{product_id}'. Supported products: {supported}")]
    NotFound {
        product_id: String,
        supported: String,
    },

    /// The spec endpoint answered with a non-success status.
    #[error("Failed to retrieve {vendor} spec: HTTP {status}")]
    HttpStatus { vendor: &'static str, status: u16 },

    /// The spec endpoint could not be reached.
    #[error("Failed to connect to {vendor} API: {message}")]
    Connection {
        vendor: &'static str,
        message: String,
    },

    /// The spec body was not valid JSON.
    #[error("Invalid {vendor} spec document: {message}")]
    InvalidSpec {
        vendor: &'static str,
        message: String,
    },

    /// A credential the vendor needs is absent.
    #[error("{vendor} credentials must include '{key}' field")]
    MissingCredential {
        vendor: &'static str,
        key: &'static str,
    },

    /// A credential could not be encoded as a header value.
    #[error("{vendor} credential '{key}' is not a valid header value")]
    InvalidCredential {
        vendor: &'static str,
        key: &'static str,
    },
}
