//! Generic request execution: URL assembly, auth, retry with exponential
//! backoff and response-shape normalization.

use std::time::Duration;

use indexmap::IndexMap;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, Response};
use serde_json::{Map, Value};
use toolkit_engine_core::Endpoint;
use tracing::{debug, instrument, warn};

use super::credentials::{API_TOKEN, Credentials};
use super::error::ApiError;
use crate::adapters::ProductAdapter;

/// Per-attempt timeout when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Attempts per request when none is configured.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Base of the exponential backoff (`2^attempt` units between attempts).
pub const DEFAULT_BACKOFF_UNIT: Duration = Duration::from_secs(1);

/// Query parameters, in insertion order.
pub type QueryParams = IndexMap<String, String>;

/// How many times to try and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_retries: u32,
    /// Multiplied by `2^attempt` to get each wait.
    pub backoff_unit: Duration,
}

impl RetryPolicy {
    /// Wait after the zero-based `attempt` failed.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff_unit.saturating_mul(2_u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_unit: DEFAULT_BACKOFF_UNIT,
        }
    }
}

/// Knobs for building a client.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Total attempts per request.
    pub max_retries: u32,
    /// Backoff base unit.
    pub backoff_unit: Duration,
    /// Shared transport. When `None` the client builds and owns its own.
    pub http_client: Option<Client>,
}

impl ClientOptions {
    /// Use a caller-owned transport.
    #[must_use]
    pub fn with_http_client(mut self, http_client: Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            backoff_unit: self.backoff_unit,
        }
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_unit: DEFAULT_BACKOFF_UNIT,
            http_client: None,
        }
    }
}

/// Path, query and body for one call.
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    /// Values substituted into `{name}` placeholders.
    pub path_params: IndexMap<String, String>,
    pub query: QueryParams,
    pub body: Option<Value>,
}

impl RequestParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Replace every `{name}` with its value. Unknown placeholders stay as-is.
#[must_use]
pub fn substitute_path_params<K, V>(template: &str, params: impl IntoIterator<Item = (K, V)>) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    params
        .into_iter()
        .fold(template.to_string(), |path, (name, value)| {
            path.replace(&format!("{{{}}}", name.as_ref()), value.as_ref())
        })
}

/// Join base and path with exactly one `/`.
#[must_use]
pub fn build_url(base_url: &str, path: &str) -> String {
    let base = base_url.strip_suffix('/').unwrap_or(base_url);
    let path = path.strip_prefix('/').unwrap_or(path);
    format!("{base}/{path}")
}

/// Pull the record list out of a list response.
///
/// Arrays pass through; objects yield their `results` (HubSpot) or `data`
/// (Pipedrive) member; any other non-empty body becomes a one-element list.
#[must_use]
pub fn normalize_list(body: Value) -> Vec<Value> {
    fn into_items(value: Value) -> Vec<Value> {
        match value {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => vec![other],
        }
    }

    match body {
        Value::Object(mut map) => {
            if let Some(results) = map.remove("results") {
                into_items(results)
            } else if let Some(data) = map.remove("data") {
                into_items(data)
            } else if map.is_empty() {
                Vec::new()
            } else {
                vec![Value::Object(map)]
            }
        }
        other => into_items(other),
    }
}

#[derive(Debug)]
struct Transport {
    http: Option<Client>,
    owned: bool,
}

/// Sends requests for one product's base URL.
#[derive(Debug)]
pub struct RequestExecutor {
    base_url: String,
    transport: Transport,
    timeout: Duration,
    policy: RetryPolicy,
}

impl RequestExecutor {
    /// Build an executor. Owns a fresh transport unless `options` carries one.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>, options: ClientOptions) -> Result<Self, ApiError> {
        let policy = options.retry_policy();
        let transport = match options.http_client {
            Some(http) => Transport {
                http: Some(http),
                owned: false,
            },
            None => Transport {
                http: Some(
                    Client::builder()
                        .build()
                        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?,
                ),
                owned: true,
            },
        };

        Ok(Self {
            base_url: base_url.into(),
            transport,
            timeout: options.timeout,
            policy,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Whether the transport was built by this executor.
    #[must_use]
    pub const fn owns_transport(&self) -> bool {
        self.transport.owned
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.transport.http.is_none()
    }

    /// Release the transport. Returns `true` only on the call that closed it.
    ///
    /// A caller-supplied transport is detached, not shut down.
    pub fn close(&mut self) -> bool {
        match self.transport.http.take() {
            Some(_) => {
                debug!(owned = self.transport.owned, "Released HTTP transport");
                true
            }
            None => false,
        }
    }

    /// Run one endpoint call with retries.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Client`] on the first 4xx, the last server or
    /// network error once attempts run out, or [`ApiError::TransportClosed`]
    /// after [`close`](Self::close).
    #[instrument(
        skip(self, params, adapter, credentials),
        fields(method = %endpoint.http_method, path = %endpoint.path)
    )]
    pub async fn execute(
        &self,
        endpoint: &Endpoint,
        params: &RequestParams,
        adapter: &dyn ProductAdapter,
        credentials: &Credentials,
    ) -> Result<Value, ApiError> {
        let http = self.transport.http.as_ref().ok_or(ApiError::TransportClosed)?;

        let method = Method::from_bytes(endpoint.http_method.to_ascii_uppercase().as_bytes())
            .map_err(|_| {
                ApiError::InvalidRequest(format!("unsupported HTTP method '{}'", endpoint.http_method))
            })?;
        let path = substitute_path_params(&endpoint.path, &params.path_params);
        let url = build_url(&self.base_url, &path);

        let mut headers = adapter
            .build_auth_headers(credentials)
            .map_err(|e| ApiError::Credentials(e.to_string()))?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut query = params.query.clone();
        if let Some(token) = credentials.expose(API_TOKEN) {
            query.insert(API_TOKEN.to_string(), token.to_string());
        }

        let mut last_error = None;
        for attempt in 0..self.policy.max_retries {
            let request = Attempt {
                http,
                method: &method,
                url: &url,
                headers: &headers,
                query: &query,
                body: params.body.as_ref(),
                timeout: self.timeout,
            };

            match request.send().await {
                Ok(body) => {
                    debug!(attempt = attempt + 1, "Request succeeded");
                    return Ok(body);
                }
                Err(err) if err.is_retryable() => {
                    warn!(
                        attempt = attempt + 1,
                        max_retries = self.policy.max_retries,
                        error = %err,
                        "Request attempt failed"
                    );
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }

            if attempt + 1 < self.policy.max_retries {
                tokio::time::sleep(self.policy.delay_after(attempt)).await;
            }
        }

        Err(last_error.unwrap_or(ApiError::Exhausted(self.policy.max_retries)))
    }
}

struct Attempt<'a> {
    http: &'a Client,
    method: &'a Method,
    url: &'a str,
    headers: &'a HeaderMap,
    query: &'a QueryParams,
    body: Option<&'a Value>,
    timeout: Duration,
}

impl Attempt<'_> {
    async fn send(&self) -> Result<Value, ApiError> {
        let mut request = self
            .http
            .request(self.method.clone(), self.url)
            .headers(self.headers.clone())
            .timeout(self.timeout);
        if !self.query.is_empty() {
            request = request.query(self.query);
        }
        if let Some(body) = self.body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_builder() {
                ApiError::InvalidRequest(e.to_string())
            } else {
                ApiError::Network(e.to_string())
            }
        })?;
        classify(response).await
    }
}

async fn classify(response: Response) -> Result<Value, ApiError> {
    let status = response.status();

    if status.is_success() {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        if bytes.is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        return serde_json::from_slice(&bytes).map_err(|e| ApiError::InvalidResponse(e.to_string()));
    }

    let body = response.text().await.unwrap_or_else(|e| {
        debug!(status = status.as_u16(), error = %e, "Failed to read error body");
        String::new()
    });
    if status.is_client_error() {
        Err(ApiError::Client {
            status: status.as_u16(),
            body,
        })
    } else {
        Err(ApiError::Server {
            status: status.as_u16(),
            body,
        })
    }
}
