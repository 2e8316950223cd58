//! HTTP client for the service desk backend.
//!
//! This module provides `DeskClient`, the single path every backend call
//! takes. [`DeskClient::request`] decides headers, attaches the bearer
//! token and normalizes failures; the resource methods below it only
//! build paths, query strings and bodies.
//!
//! # Failure handling
//!
//! Every response body is parsed as JSON, error responses included. A
//! non-success status becomes [`DeskError::Api`] carrying the backend's
//! `detail`; a body that is not JSON becomes [`DeskError::InvalidJson`].
//! Failures are logged and returned as-is. Nothing is retried, and no
//! timeout is applied.
//!
//! # Security
//!
//! The bearer token and passwords are never logged.

use std::fmt::Display;
use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::Config;
use crate::error::DeskError;
use crate::models::{
    AssignTicket, Credentials, LoginResponse, MlLogQuery, QueryParams, StatusUpdate,
    TicketFilters, TrainingJobQuery, TriageResolution,
};
use crate::session::{KeyValueStore, SessionStore};

/// The content type sent with, and expected from, every call.
const JSON_CONTENT_TYPE: &str = "application/json";

/// How a single call to [`DeskClient::request`] is made.
///
/// Defaults to an authenticated `GET` without a body.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    method: Method,
    auth: bool,
    body: Option<Value>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            auth: true,
            body: None,
        }
    }
}

impl RequestOptions {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Never attach the bearer token, even if one is stored.
    pub fn without_auth(mut self) -> Self {
        self.auth = false;
        self
    }
}

/// HTTP client for the service desk backend.
///
/// Owns its session; cloning shares it, so a login through one clone
/// authenticates all of them.
///
/// # Example
///
/// ```ignore
/// let config = Config::resolve(&NoPage);
/// let client = DeskClient::new(&config, Arc::new(MemoryStorage::new()))?;
///
/// client.login("lead@desk.io", "secret").await?;
/// let triage = client
///     .get_tickets(&TicketFilters::new().with_status("TRIAGE"))
///     .await?;
/// ```
#[derive(Clone)]
pub struct DeskClient {
    /// The underlying HTTP client (cloning is cheap).
    http: Client,

    /// Base address resolved at construction; never changes afterwards.
    base_url: String,

    /// Current bearer token and its durable backing.
    session: Arc<SessionStore>,
}

impl DeskClient {
    /// Creates a client, loading any persisted token from `storage`.
    ///
    /// # Errors
    ///
    /// Returns `DeskError::HttpClient` if the HTTP client fails to initialize,
    /// or `DeskError::Storage` if the session store cannot be read.
    pub fn new(config: &Config, storage: Arc<dyn KeyValueStore>) -> Result<Self, DeskError> {
        let http = Client::builder().build().map_err(DeskError::HttpClient)?;
        let session = SessionStore::load(storage)?;

        tracing::debug!(base_url = %config.base_url, "Desk client initialized");

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            session: Arc::new(session),
        })
    }

    /// The base address every endpoint is appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The client's session.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Returns true if a bearer token is stored.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Percent-encodes an identifier for use as one path segment.
    fn segment(id: impl Display) -> String {
        urlencoding::encode(&id.to_string()).into_owned()
    }

    /// Sends a request to the backend and returns the parsed JSON body.
    ///
    /// `endpoint` is appended to the base address and should start with `/`.
    /// The bearer token is read from the session when the call starts and
    /// attached unless the options disable auth.
    ///
    /// # Errors
    ///
    /// - `DeskError::Network` if the backend cannot be reached
    /// - `DeskError::InvalidJson` if the body is not JSON
    /// - `DeskError::Api` for a non-success status, with the backend `detail`
    ///
    /// Every error is logged before it is returned.
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<Value, DeskError> {
        let method = options.method.clone();
        self.request_inner(endpoint, options).await.inspect_err(|e| {
            tracing::error!(
                method = %method,
                endpoint = %endpoint,
                status = ?e.status(),
                error = ?e,
                "API error"
            );
        })
    }

    async fn request_inner(&self, endpoint: &str, options: RequestOptions) -> Result<Value, DeskError> {
        let RequestOptions { method, auth, body } = options;
        let url = format!("{}{}", self.base_url, endpoint);
        let token = if auth { self.session.token() } else { None };

        tracing::debug!(
            method = %method,
            endpoint = %endpoint,
            authenticated = token.is_some(),
            "Making desk API request"
        );

        let mut req = self
            .http
            .request(method, &url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE);

        if let Some(token) = token {
            req = req.bearer_auth(token);
        }

        if let Some(body) = body {
            req = req.body(serde_json::to_vec(&body)?);
        }

        let response = req.send().await.map_err(DeskError::Network)?;
        let status = response.status();
        let text = response.text().await.map_err(DeskError::Network)?;

        let data: Value = serde_json::from_str(&text)
            .map_err(|source| DeskError::InvalidJson { status, source })?;

        if !status.is_success() {
            return Err(DeskError::from_error_body(status, &data));
        }

        Ok(data)
    }

    // ========================================================================
    // Private helpers for HTTP verbs
    // ========================================================================

    async fn get(&self, path: &str) -> Result<Value, DeskError> {
        self.request(path, RequestOptions::new()).await
    }

    async fn send_json<B>(&self, method: Method, path: &str, body: &B) -> Result<Value, DeskError>
    where
        B: Serialize + ?Sized,
    {
        let body = encode_body(path, body)?;
        self.request(path, RequestOptions::new().with_method(method).with_body(body))
            .await
    }

    async fn post<B>(&self, path: &str, body: &B) -> Result<Value, DeskError>
    where
        B: Serialize + ?Sized,
    {
        self.send_json(Method::POST, path, body).await
    }

    async fn patch<B>(&self, path: &str, body: &B) -> Result<Value, DeskError>
    where
        B: Serialize + ?Sized,
    {
        self.send_json(Method::PATCH, path, body).await
    }

    // ========================================================================
    // Auth
    // ========================================================================

    /// Logs in and stores the returned token.
    ///
    /// The login call itself never carries a token. Once it succeeds every
    /// later call is authenticated.
    ///
    /// # Errors
    ///
    /// Fails if the backend rejects the credentials, if the response has no
    /// `access_token`, or if the token cannot be persisted.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, DeskError> {
        let body = encode_body("/auth/login/json", &Credentials::new(email, password))?;
        let data = self
            .request(
                "/auth/login/json",
                RequestOptions::new()
                    .with_method(Method::POST)
                    .without_auth()
                    .with_body(body),
            )
            .await?;

        let login: LoginResponse = serde_json::from_value(data).inspect_err(|e| {
            tracing::error!(error = %e, "Login response did not contain an access token");
        })?;

        self.session.set_token(&login.access_token).inspect_err(|e| {
            tracing::error!(error = %e, "Failed to persist session token");
        })?;

        tracing::info!(email = %email, "Logged in");
        Ok(login)
    }

    /// Registers a new account. Sent without a token.
    pub async fn register<B>(&self, user: &B) -> Result<Value, DeskError>
    where
        B: Serialize + ?Sized,
    {
        let body = encode_body("/auth/register", user)?;
        self.request(
            "/auth/register",
            RequestOptions::new()
                .with_method(Method::POST)
                .without_auth()
                .with_body(body),
        )
        .await
    }

    /// Gets the profile of the logged-in user.
    pub async fn get_me(&self) -> Result<Value, DeskError> {
        self.get("/auth/me").await
    }

    /// Forgets the session. Purely local; the backend is not contacted.
    ///
    /// # Errors
    ///
    /// Returns `DeskError::Storage` if the durable entries cannot be removed.
    /// The client is logged out in memory regardless.
    pub fn logout(&self) -> Result<(), DeskError> {
        self.session.clear().inspect_err(|e| {
            tracing::error!(error = %e, "Failed to clear persisted session");
        })?;
        tracing::info!("Logged out");
        Ok(())
    }

    // ========================================================================
    // Tickets
    // ========================================================================

    /// Lists tickets matching the filters.
    ///
    /// Filters without a value are not sent; with no filters left the bare
    /// `/tickets` path is requested.
    pub async fn get_tickets(&self, filters: &TicketFilters) -> Result<Value, DeskError> {
        let path = filters.to_query().append_to("/tickets");
        self.get(&path).await
    }

    /// Gets one ticket.
    pub async fn get_ticket(&self, id: impl Display) -> Result<Value, DeskError> {
        self.get(&format!("/tickets/{}", Self::segment(id))).await
    }

    /// Creates a ticket from a backend-defined payload.
    pub async fn create_ticket<B>(&self, data: &B) -> Result<Value, DeskError>
    where
        B: Serialize + ?Sized,
    {
        self.post("/tickets", data).await
    }

    /// Updates ticket fields.
    pub async fn update_ticket<B>(&self, id: impl Display, data: &B) -> Result<Value, DeskError>
    where
        B: Serialize + ?Sized,
    {
        self.patch(&format!("/tickets/{}", Self::segment(id)), data)
            .await
    }

    /// Moves a ticket to another status. Transition rules live in the backend.
    pub async fn update_ticket_status(
        &self,
        id: impl Display,
        status: &str,
    ) -> Result<Value, DeskError> {
        let body = StatusUpdate {
            status: status.to_string(),
        };
        self.patch(&format!("/tickets/{}/status", Self::segment(id)), &body)
            .await
    }

    /// Takes a ticket for the logged-in agent.
    pub async fn claim_ticket(&self, id: impl Display) -> Result<Value, DeskError> {
        self.post(&format!("/tickets/{}/claim", Self::segment(id)), &json!({}))
            .await
    }

    /// Assigns a ticket to an agent, or unassigns it with `None`.
    pub async fn assign_ticket(
        &self,
        id: impl Display,
        assignee_id: Option<i64>,
    ) -> Result<Value, DeskError> {
        let body = AssignTicket { assignee_id };
        self.patch(&format!("/tickets/{}/assign", Self::segment(id)), &body)
            .await
    }

    /// Settles triage with the final priority and category.
    ///
    /// `reason` is only sent when present and non-empty.
    pub async fn resolve_triage(
        &self,
        id: impl Display,
        priority_final: &str,
        category_final: &str,
        reason: Option<&str>,
    ) -> Result<Value, DeskError> {
        let body = TriageResolution::new(priority_final, category_final).with_reason(reason);
        self.patch(
            &format!("/tickets/{}/triage/resolve", Self::segment(id)),
            &body,
        )
        .await
    }

    /// Reruns ML classification for a ticket.
    pub async fn recalculate_ml(&self, id: impl Display) -> Result<Value, DeskError> {
        self.post(
            &format!("/tickets/{}/ml/recalculate", Self::segment(id)),
            &json!({}),
        )
        .await
    }

    /// Confirms or rejects an automatic assignment.
    pub async fn confirm_assignment(
        &self,
        id: impl Display,
        confirmed: bool,
        feedback: Option<&str>,
    ) -> Result<Value, DeskError> {
        let mut params = QueryParams::new();
        params
            .push("confirmed", confirmed)
            .push_opt("feedback", feedback.filter(|f| !f.is_empty()));
        let path = params.append_to(&format!(
            "/tickets/{}/assignment/confirm",
            Self::segment(id)
        ));
        self.post(&path, &json!({})).await
    }

    // ========================================================================
    // Departments
    // ========================================================================

    /// Lists departments.
    pub async fn get_departments(&self) -> Result<Value, DeskError> {
        self.get("/departments").await
    }

    // ========================================================================
    // ML logs and training
    // ========================================================================

    /// Lists ML prediction logs.
    pub async fn get_ml_logs(&self, query: &MlLogQuery) -> Result<Value, DeskError> {
        self.get(&query.to_query().append_to("/ml/logs")).await
    }

    /// Gets whether a retrain is due.
    pub async fn get_training_status(&self) -> Result<Value, DeskError> {
        self.get("/ml/training/status").await
    }

    /// Starts a training run; `force` retrains even without enough new feedback.
    pub async fn trigger_training(&self, force: bool) -> Result<Value, DeskError> {
        let path = if force {
            "/ml/training/trigger?force=true"
        } else {
            "/ml/training/trigger"
        };
        self.post(path, &json!({})).await
    }

    /// Lists model versions.
    pub async fn get_models(&self, limit: Option<u32>) -> Result<Value, DeskError> {
        let mut params = QueryParams::new();
        params.push_opt("limit", limit);
        self.get(&params.append_to("/ml/training/models")).await
    }

    /// Gets one model version.
    pub async fn get_model(&self, version: &str) -> Result<Value, DeskError> {
        self.get(&format!("/ml/training/models/{}", Self::segment(version)))
            .await
    }

    /// Makes a model version the active one.
    pub async fn activate_model(&self, version: &str) -> Result<Value, DeskError> {
        self.post(
            &format!("/ml/training/models/{}/activate", Self::segment(version)),
            &json!({}),
        )
        .await
    }

    /// Lists training jobs.
    pub async fn get_training_jobs(&self, query: &TrainingJobQuery) -> Result<Value, DeskError> {
        self.get(&query.to_query().append_to("/ml/training/jobs"))
            .await
    }

    /// Gets one training job.
    pub async fn get_training_job(&self, job_id: impl Display) -> Result<Value, DeskError> {
        self.get(&format!("/ml/training/jobs/{}", Self::segment(job_id)))
            .await
    }
}

/// Serializes a request body, logging the failure like any other.
fn encode_body<B>(endpoint: &str, body: &B) -> Result<Value, DeskError>
where
    B: Serialize + ?Sized,
{
    serde_json::to_value(body).map_err(|e| {
        tracing::error!(endpoint = %endpoint, error = %e, "Failed to encode request body");
        DeskError::Serialization(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStorage;

    /// Nothing listens on the discard port, so connections are refused.
    const UNREACHABLE: &str = "http://127.0.0.1:9";

    fn test_client(storage: MemoryStorage) -> DeskClient {
        DeskClient::new(&Config::with_base_url(UNREACHABLE), Arc::new(storage)).unwrap()
    }

    #[test]
    fn test_request_options_defaults() {
        let options = RequestOptions::new();
        assert_eq!(options.method, Method::GET);
        assert!(options.auth);
        assert!(options.body.is_none());
    }

    #[test]
    fn test_request_options_builder() {
        let options = RequestOptions::new()
            .with_method(Method::PATCH)
            .without_auth()
            .with_body(json!({"status": "NEW"}));
        assert_eq!(options.method, Method::PATCH);
        assert!(!options.auth);
        assert_eq!(options.body, Some(json!({"status": "NEW"})));
    }

    #[test]
    fn test_segment_encodes_separators() {
        assert_eq!(DeskClient::segment(42), "42");
        assert_eq!(DeskClient::segment("v1.2"), "v1.2");
        assert_eq!(DeskClient::segment("12/claim"), "12%2Fclaim");
        assert_eq!(DeskClient::segment("a b"), "a%20b");
    }

    #[test]
    fn test_persisted_token_is_loaded() {
        let storage = MemoryStorage::new();
        storage.set(crate::session::TOKEN_KEY, "persisted").unwrap();
        let client = test_client(storage);
        assert!(client.is_authenticated());
        assert_eq!(client.session().token().as_deref(), Some("persisted"));
    }

    #[test]
    fn test_logout_is_local() {
        let storage = MemoryStorage::new();
        storage.set(crate::session::TOKEN_KEY, "persisted").unwrap();
        let client = test_client(storage.clone());

        // No backend is reachable; logout must still succeed.
        client.logout().unwrap();

        assert!(!client.is_authenticated());
        assert_eq!(storage.get(crate::session::TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_clones_share_session() {
        let client = test_client(MemoryStorage::new());
        let other = client.clone();
        client.session().set_token("shared").unwrap();
        assert!(other.is_authenticated());
    }

    #[test]
    fn test_network_failure_is_reported() {
        let client = test_client(MemoryStorage::new());
        let err = tokio_test::block_on(client.get_departments()).unwrap_err();
        assert!(matches!(err, DeskError::Network(_)));
        assert_eq!(err.message(), crate::error::GENERIC_FAILURE);
    }
}
