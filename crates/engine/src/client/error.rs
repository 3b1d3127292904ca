//! Error types for the uniform client.

use thiserror::Error;

/// A classified failure from the request executor.
///
/// Client errors (4xx) fail immediately. Server (5xx) and network errors are
/// retried; when retries run out the last one is returned.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API rejected the request (4xx). Never retried.
    #[error("API request failed: {status} {body}")]
    Client {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// The API failed to serve the request (5xx).
    #[error("Server error: {status} {body}")]
    Server {
        /// HTTP status code of the last attempt.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// Connection, timeout or body transfer failure.
    #[error("Request failed: {0}")]
    Network(String),

    /// A 2xx response whose body is not JSON.
    #[error("Invalid response body: {0}")]
    InvalidResponse(String),

    /// The request could not be built (bad method, URL or header value).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The adapter could not build auth headers from the credentials.
    #[error("Invalid credentials: {0}")]
    Credentials(String),

    /// The client was closed before this call.
    #[error("HTTP transport is closed; build a new client")]
    TransportClosed,

    /// `max_retries` was zero, so nothing was attempted.
    #[error("Request failed after {0} attempts")]
    Exhausted(u32),
}

impl ApiError {
    /// HTTP status code, for errors that came from a response.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Client { status, .. } | Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether another attempt might succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Server { .. } | Self::Network(_))
    }
}

/// Errors surfaced by [`CrmClient`](super::CrmClient) operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The mapping has no endpoint for the requested operation.
    #[error(
        "No '{action}' endpoint configured for {entity}. Run 'toolkit-engine select --id {product_id}' to map it."
    )]
    MissingEndpoint {
        product_id: String,
        entity: String,
        action: String,
    },

    /// The underlying request failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ClientError {
    /// HTTP status code of the underlying request failure, if any.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api(err) => err.status_code(),
            Self::MissingEndpoint { .. } => None,
        }
    }
}
