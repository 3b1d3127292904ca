//! Uniform CRUD client over a product's endpoint mapping.

use serde_json::Value;
use toolkit_engine_core::{CrudAction, Endpoint, EndpointMapping, EntityKind, ProductDefinition};
use tracing::{debug, instrument};

use super::credentials::Credentials;
use super::error::{ApiError, ClientError};
use super::executor::{ClientOptions, QueryParams, RequestExecutor, RequestParams, normalize_list};
use crate::adapters::ProductAdapter;

/// List, get, create and update for contacts and organisations, whatever
/// the vendor's URL layout.
///
/// The mapping and credentials are fixed at construction. The transport is
/// released by [`close`](Self::close) or on drop.
pub struct CrmClient {
    product: ProductDefinition,
    mapping: EndpointMapping,
    adapter: Box<dyn ProductAdapter>,
    credentials: Credentials,
    executor: RequestExecutor,
}

impl std::fmt::Debug for CrmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrmClient")
            .field("product_id", &self.product.product_id)
            .field("base_url", &self.product.api_base_url)
            .field("endpoints", &self.mapping.endpoint_count())
            .field("credentials", &self.credentials)
            .field("closed", &self.executor.is_closed())
            .finish_non_exhaustive()
    }
}

impl CrmClient {
    /// Build a client for `product` using a previously selected mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP transport cannot be built.
    pub fn new(
        product: ProductDefinition,
        mapping: EndpointMapping,
        adapter: Box<dyn ProductAdapter>,
        credentials: Credentials,
        options: ClientOptions,
    ) -> Result<Self, ApiError> {
        let executor = RequestExecutor::new(product.api_base_url.clone(), options)?;
        Ok(Self {
            product,
            mapping,
            adapter,
            credentials,
            executor,
        })
    }

    #[must_use]
    pub const fn product(&self) -> &ProductDefinition {
        &self.product
    }

    #[must_use]
    pub const fn mapping(&self) -> &EndpointMapping {
        &self.mapping
    }

    #[must_use]
    pub const fn owns_transport(&self) -> bool {
        self.executor.owns_transport()
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.executor.is_closed()
    }

    /// Release the transport. Safe to call more than once; later calls
    /// fail with [`ApiError::TransportClosed`].
    pub fn close(&mut self) -> bool {
        self.executor.close()
    }

    fn endpoint(&self, entity: EntityKind, action: CrudAction) -> Result<&Endpoint, ClientError> {
        self.mapping
            .get(entity.as_str(), action.as_str())
            .ok_or_else(|| ClientError::MissingEndpoint {
                product_id: self.product.product_id.clone(),
                entity: entity.to_string(),
                action: action.to_string(),
            })
    }

    async fn call(
        &self,
        entity: EntityKind,
        action: CrudAction,
        params: RequestParams,
    ) -> Result<Value, ClientError> {
        let endpoint = self.endpoint(entity, action)?;
        debug!(
            entity = %entity,
            action = %action,
            method = %endpoint.http_method,
            path = %endpoint.path,
            "Dispatching request"
        );
        let body = self
            .executor
            .execute(endpoint, &params, self.adapter.as_ref(), &self.credentials)
            .await?;
        Ok(body)
    }

    fn with_id(entity: EntityKind, id: &str) -> RequestParams {
        entity
            .id_params()
            .iter()
            .fold(RequestParams::new(), |params, name| params.path_param(*name, id))
    }

    /// List records, passing `filters` as query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MissingEndpoint`] if the mapping has no list
    /// endpoint, or the request error.
    #[instrument(skip(self, filters), fields(product_id = %self.product.product_id))]
    pub async fn list(
        &self,
        entity: EntityKind,
        filters: Option<&QueryParams>,
    ) -> Result<Vec<Value>, ClientError> {
        let params = RequestParams::new().query(filters.cloned().unwrap_or_default());
        let body = self.call(entity, CrudAction::List, params).await?;
        Ok(normalize_list(body))
    }

    /// Fetch one record.
    ///
    /// # Errors
    ///
    /// See [`list`](Self::list).
    #[instrument(skip(self), fields(product_id = %self.product.product_id))]
    pub async fn get(&self, entity: EntityKind, id: &str) -> Result<Value, ClientError> {
        self.call(entity, CrudAction::Get, Self::with_id(entity, id))
            .await
    }

    /// Create a record from `payload`.
    ///
    /// # Errors
    ///
    /// See [`list`](Self::list).
    #[instrument(skip(self, payload), fields(product_id = %self.product.product_id))]
    pub async fn create(&self, entity: EntityKind, payload: Value) -> Result<Value, ClientError> {
        self.call(entity, CrudAction::Create, RequestParams::new().json(payload))
            .await
    }

    /// Update a record with `payload`.
    ///
    /// # Errors
    ///
    /// See [`list`](Self::list).
    #[instrument(skip(self, payload), fields(product_id = %self.product.product_id))]
    pub async fn update(
        &self,
        entity: EntityKind,
        id: &str,
        payload: Value,
    ) -> Result<Value, ClientError> {
        self.call(entity, CrudAction::Update, Self::with_id(entity, id).json(payload))
            .await
    }

    /// # Errors
    ///
    /// See [`list`](Self::list).
    pub async fn list_contacts(
        &self,
        filters: Option<&QueryParams>,
    ) -> Result<Vec<Value>, ClientError> {
        self.list(EntityKind::Contacts, filters).await
    }

    /// # Errors
    ///
    /// See [`list`](Self::list).
    pub async fn get_contact(&self, contact_id: &str) -> Result<Value, ClientError> {
        self.get(EntityKind::Contacts, contact_id).await
    }

    /// # Errors
    ///
    /// See [`list`](Self::list).
    pub async fn create_contact(&self, payload: Value) -> Result<Value, ClientError> {
        self.create(EntityKind::Contacts, payload).await
    }

    /// # Errors
    ///
    /// See [`list`](Self::list).
    pub async fn update_contact(
        &self,
        contact_id: &str,
        payload: Value,
    ) -> Result<Value, ClientError> {
        self.update(EntityKind::Contacts, contact_id, payload).await
    }

    /// # Errors
    ///
    /// See [`list`](Self::list).
    pub async fn list_organisations(
        &self,
        filters: Option<&QueryParams>,
    ) -> Result<Vec<Value>, ClientError> {
        self.list(EntityKind::Organisations, filters).await
    }

    /// # Errors
    ///
    /// See [`list`](Self::list).
    pub async fn get_organisation(&self, organisation_id: &str) -> Result<Value, ClientError> {
        self.get(EntityKind::Organisations, organisation_id).await
    }

    /// # Errors
    ///
    /// See [`list`](Self::list).
    pub async fn create_organisation(&self, payload: Value) -> Result<Value, ClientError> {
        self.create(EntityKind::Organisations, payload).await
    }

    /// # Errors
    ///
    /// See [`list`](Self::list).
    pub async fn update_organisation(
        &self,
        organisation_id: &str,
        payload: Value,
    ) -> Result<Value, ClientError> {
        self.update(EntityKind::Organisations, organisation_id, payload)
            .await
    }
}

impl Drop for CrmClient {
    fn drop(&mut self) {
        self.executor.close();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::time::Duration;

    use axum::extract::{Path, Query};
    use axum::http::{Method, Uri};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use toolkit_engine_core::{AuthMethod, ProductType};

    use super::*;
    use crate::adapters::{HubSpotAdapter, PipedriveAdapter};

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}")
    }

    async fn echo(method: Method, uri: Uri) -> Json<Value> {
        Json(json!({"method": method.as_str(), "uri": uri.to_string()}))
    }

    async fn echo_body(method: Method, uri: Uri, Json(body): Json<Value>) -> Json<Value> {
        Json(json!({"method": method.as_str(), "uri": uri.to_string(), "body": body}))
    }

    fn hubspot_mapping() -> EndpointMapping {
        let mut mapping = EndpointMapping::new();
        mapping.insert("contacts", "list", Endpoint::new("GET", "/crm/v3/objects/contacts"));
        mapping.insert(
            "contacts",
            "get",
            Endpoint::new("GET", "/crm/v3/objects/contacts/{contactId}"),
        );
        mapping.insert("contacts", "create", Endpoint::new("POST", "/crm/v3/objects/contacts"));
        mapping.insert(
            "contacts",
            "update",
            Endpoint::new("PATCH", "/crm/v3/objects/contacts/{contactId}"),
        );
        mapping.insert(
            "organisations",
            "get",
            Endpoint::new("GET", "/crm/v3/objects/companies/{companyId}"),
        );
        mapping
    }

    fn hubspot_client(base_url: &str, mapping: EndpointMapping) -> CrmClient {
        let product = ProductDefinition::new(
            "hubspot",
            "HubSpot",
            ProductType::Crm,
            base_url,
            AuthMethod::Oauth2,
        );
        CrmClient::new(
            product.clone(),
            mapping,
            Box::new(HubSpotAdapter::new(product)),
            Credentials::single("access_token", "pat"),
            ClientOptions {
                backoff_unit: Duration::from_millis(1),
                ..ClientOptions::default()
            },
        )
        .unwrap()
    }

    fn hubspot_router() -> Router {
        Router::new()
            .route(
                "/crm/v3/objects/contacts",
                get(|| async { Json(json!({"results": [{"id": "1"}, {"id": "2"}]})) }).post(echo_body),
            )
            .route(
                "/crm/v3/objects/contacts/{id}",
                get(|Path(id): Path<String>| async move { Json(json!({"id": id})) }).patch(echo_body),
            )
            .route("/crm/v3/objects/companies/{id}", get(echo))
    }

    #[tokio::test]
    async fn test_list_contacts_normalizes_results() {
        let base = spawn(hubspot_router()).await;
        let client = hubspot_client(&base, hubspot_mapping());

        let contacts = client.list_contacts(None).await.unwrap();
        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0]["id"], "1");
    }

    #[tokio::test]
    async fn test_get_contact_substitutes_id() {
        let base = spawn(hubspot_router()).await;
        let client = hubspot_client(&base, hubspot_mapping());

        let contact = client.get_contact("123").await.unwrap();
        assert_eq!(contact["id"], "123");
    }

    #[tokio::test]
    async fn test_get_organisation_uses_company_placeholder() {
        let base = spawn(hubspot_router()).await;
        let client = hubspot_client(&base, hubspot_mapping());

        let body = client.get_organisation("77").await.unwrap();
        assert_eq!(body["uri"], "/crm/v3/objects/companies/77");
    }

    #[tokio::test]
    async fn test_create_and_update_send_json_body() {
        let base = spawn(hubspot_router()).await;
        let client = hubspot_client(&base, hubspot_mapping());

        let payload = json!({"properties": {"email": "a@example.com"}});
        let created = client.create_contact(payload.clone()).await.unwrap();
        assert_eq!(created["method"], "POST");
        assert_eq!(created["body"], payload);

        let updated = client.update_contact("9", payload.clone()).await.unwrap();
        assert_eq!(updated["method"], "PATCH");
        assert_eq!(updated["uri"], "/crm/v3/objects/contacts/9");
        assert_eq!(updated["body"], payload);
    }

    #[tokio::test]
    async fn test_missing_endpoint_is_configuration_error() {
        let base = spawn(hubspot_router()).await;
        let client = hubspot_client(&base, hubspot_mapping());

        let err = client.list_organisations(None).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::MissingEndpoint { ref entity, ref action, .. }
                if entity == "organisations" && action == "list"
        ));
    }

    #[tokio::test]
    async fn test_pipedrive_list_passes_filters_and_token() {
        let app = Router::new().route(
            "/v1/persons",
            get(
                |Query(q): Query<std::collections::HashMap<String, String>>| async move {
                    Json(json!({
                        "success": true,
                        "data": [{"id": 1, "token": q.get("api_token"), "start": q.get("start")}]
                    }))
                },
            ),
        );
        let base = spawn(app).await;
        let product = ProductDefinition::new(
            "pipedrive",
            "Pipedrive",
            ProductType::Crm,
            format!("{base}/v1/"),
            AuthMethod::ApiKey,
        );
        let mut mapping = EndpointMapping::new();
        mapping.insert("contacts", "list", Endpoint::new("GET", "/persons"));
        let client = CrmClient::new(
            product.clone(),
            mapping,
            Box::new(PipedriveAdapter::new(product)),
            Credentials::single("api_token", "pd"),
            ClientOptions::default(),
        )
        .unwrap();

        let mut filters = QueryParams::new();
        filters.insert("start".to_string(), "0".to_string());
        let persons = client.list_contacts(Some(&filters)).await.unwrap();

        assert_eq!(persons.len(), 1);
        assert_eq!(persons[0]["token"], "pd");
        assert_eq!(persons[0]["start"], "0");
    }

    #[tokio::test]
    async fn test_close_then_call_fails_fast() {
        let base = spawn(hubspot_router()).await;
        let mut client = hubspot_client(&base, hubspot_mapping());
        assert!(client.owns_transport());

        assert!(client.close());
        assert!(!client.close());

        let err = client.list_contacts(None).await.unwrap_err();
        assert!(matches!(err, ClientError::Api(ApiError::TransportClosed)));
    }

    #[test]
    fn test_debug_hides_credentials() {
        let client = hubspot_client("https://api.hubapi.com", hubspot_mapping());
        let debug = format!("{client:?}");
        assert!(debug.contains("hubspot"));
        assert!(!debug.contains("pat\""));
        assert!(debug.contains("[REDACTED]"));
    }
}
