//! Shared fixtures for the toolkit engine integration tests.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p toolkit-engine-integration-tests
//! ```
//!
//! Every test talks to an in-process `axum` server bound to `127.0.0.1:0`
//! and stores its JSON in a fresh temporary directory.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tempfile::TempDir;
use toolkit_engine::ConfigStore;

/// Serve `app` on an ephemeral local port and return its base URL.
///
/// # Panics
///
/// Panics if the listener cannot be bound.
#[allow(clippy::expect_used)]
pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind local listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

/// A store rooted in a temporary directory that lives as long as this value.
pub struct Workspace {
    _dir: TempDir,
    pub store: ConfigStore,
}

impl Workspace {
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[allow(clippy::expect_used)]
    #[must_use]
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = ConfigStore::new(dir.path().join("toolkit_engine"));
        Self { _dir: dir, store }
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

/// A HubSpot-shaped OpenAPI document with some ambiguous operations.
#[must_use]
pub fn hubspot_spec() -> Value {
    json!({
        "openapi": "3.0.0",
        "paths": {
            "/crm/v3/objects/contacts": { "get": {}, "post": {} },
            "/crm/v3/objects/contacts/search": { "post": {} },
            "/crm/v3/objects/contacts/batch/create": { "post": {} },
            "/crm/v3/objects/contacts/{contactId}": { "get": {}, "patch": {}, "delete": {} },
            "/crm/v3/objects/contacts/{contactId}/associations/{toObjectType}": { "get": {} },
            "/crm/v3/objects/companies": { "get": {}, "post": {} },
            "/crm/v3/objects/companies/{companyId}": { "get": {}, "patch": {} },
            "/crm/v3/owners": { "get": {} }
        }
    })
}

/// Request counters for [`hubspot_router`].
#[derive(Clone, Default)]
pub struct Calls {
    pub spec: Arc<AtomicUsize>,
    pub list: Arc<AtomicUsize>,
}

impl Calls {
    #[must_use]
    pub fn spec(&self) -> usize {
        self.spec.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn list(&self) -> usize {
        self.list.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
struct HubSpotState {
    calls: Calls,
    /// The first `list_failures` list calls answer 503.
    list_failures: usize,
}

async fn spec(State(state): State<HubSpotState>) -> Json<Value> {
    state.calls.spec.fetch_add(1, Ordering::SeqCst);
    Json(hubspot_spec())
}

async fn list_contacts(State(state): State<HubSpotState>) -> (StatusCode, Json<Value>) {
    let n = state.calls.list.fetch_add(1, Ordering::SeqCst);
    if n < state.list_failures {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"message": "try again"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "results": [
                {"id": "1", "properties": {"firstname": "Ada", "lastname": "Lovelace", "email": "ada@example.com"}},
                {"id": "2", "properties": {"firstname": "Grace", "email": "grace@example.com"}}
            ],
            "paging": {}
        })),
    )
}

async fn create_contact(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, Json(json!({"id": "3", "properties": body["properties"]})))
}

async fn get_contact(Path(id): Path<String>) -> Result<Json<Value>, (StatusCode, String)> {
    if id == "404" {
        return Err((StatusCode::NOT_FOUND, "contact not found".to_string()));
    }
    Ok(Json(json!({"id": id, "properties": {}})))
}

async fn update_contact(Path(id): Path<String>, Json(body): Json<Value>) -> Json<Value> {
    Json(json!({"id": id, "properties": body["properties"], "updated": true}))
}

async fn list_companies(
    Query(query): Query<std::collections::HashMap<String, String>>,
) -> Json<Value> {
    Json(json!({"results": [{"id": "c1", "limit": query.get("limit")}]}))
}

async fn get_company(Path(id): Path<String>) -> Json<Value> {
    Json(json!({"id": id, "properties": {"name": "Acme"}}))
}

/// A HubSpot stand-in serving `/spec` and the contact/company objects API.
#[must_use]
pub fn hubspot_router(calls: Calls, list_failures: usize) -> Router {
    Router::new()
        .route("/spec", get(spec))
        .route(
            "/crm/v3/objects/contacts",
            get(list_contacts).post(create_contact),
        )
        .route(
            "/crm/v3/objects/contacts/{id}",
            get(get_contact).patch(update_contact),
        )
        .route("/crm/v3/objects/companies", get(list_companies))
        .route("/crm/v3/objects/companies/{id}", get(get_company))
        .with_state(HubSpotState {
            calls,
            list_failures,
        })
}
