/**
 * API Gateway Client
 *
 * The one network boundary of the client. Every backend call goes through
 * [`ApiGateway`], which:
 *
 * - reads the credential from the [`CredentialStore`] right before each
 *   request and attaches it as `Authorization: Bearer <token>` (no header
 *   when there is no credential; the backend rejects such calls itself)
 * - on a 401 from an authenticated call either refreshes once and retries
 *   (`RefreshPolicy::Refresh`) or drops the session immediately
 *   (`RefreshPolicy::NoRefresh`)
 * - when the session cannot be recovered, clears the store and invokes the
 *   injected [`UnauthorizedHandler`] (normally a forced navigation to
 *   `/login`), once per lost credential
 *
 * A 401 only ever ends the credential it was sent with. When the store
 * already holds a newer one (a fresh login, or a refresh done by a
 * concurrent request), the request is retried with it instead.
 *
 * Every other status is surfaced to the caller unchanged; nothing else is
 * retried.
 *
 * # Endpoints
 *
 * - `POST /api/auth/login`, `POST /api/auth/register`,
 *   `POST /api/auth/refresh`, `POST /api/auth/logout`, `GET /api/auth/me`
 * - `GET|POST /api/events`, `GET|PUT|DELETE /api/events/{id}`
 * - `POST /api/events/{id}/register`, `DELETE /api/events/{id}/register`
 */

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::client::credentials::{Credential, CredentialStore};
use crate::client::error::GatewayError;
use crate::client::storage::MemoryStorage;
use crate::shared::{
    AppConfig, AuthResponse, Event, EventDraft, EventUpdate, LoginRequest, MessageResponse,
    RefreshPolicy, RefreshRequest, RegisterRequest, User,
};

/// Called after the gateway gave up on the session
pub type UnauthorizedHandler = Arc<dyn Fn() + Send + Sync>;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// One outgoing call
#[derive(Debug, Clone)]
struct ApiRequest {
    method: Method,
    path: String,
    body: Option<serde_json::Value>,
    /// false for the endpoints that establish or end a session
    intercept: bool,
    /// one-shot marker: this request already went through a refresh
    retried: bool,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>, body: Option<serde_json::Value>) -> Self {
        Self {
            method,
            path: path.into(),
            body,
            intercept: true,
            retried: false,
        }
    }

    fn without_interception(mut self) -> Self {
        self.intercept = false;
        self
    }
}

/// Lenient error envelope: `{"message": ..}` or `{"error": ..}`
#[derive(Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
    error: Option<String>,
}

struct GatewayInner {
    http: Client,
    base_url: String,
    credentials: CredentialStore,
    refresh_policy: RefreshPolicy,
    on_unauthorized: Option<UnauthorizedHandler>,
    refresh_lock: Mutex<()>,
}

/// Cheap to clone; clones share the HTTP client and the credential store
#[derive(Clone)]
pub struct ApiGateway {
    inner: Arc<GatewayInner>,
}

/// Builder for [`ApiGateway`]
pub struct ApiGatewayBuilder {
    base_url: String,
    credentials: Option<CredentialStore>,
    refresh_policy: RefreshPolicy,
    timeout: Duration,
    on_unauthorized: Option<UnauthorizedHandler>,
}

impl ApiGatewayBuilder {
    pub fn credentials(mut self, credentials: CredentialStore) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.refresh_policy = policy;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Callback run after an unrecoverable 401
    pub fn on_unauthorized<F>(mut self, handler: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_unauthorized = Some(Arc::new(handler));
        self
    }

    pub fn unauthorized_handler(mut self, handler: UnauthorizedHandler) -> Self {
        self.on_unauthorized = Some(handler);
        self
    }

    pub fn build(self) -> Result<ApiGateway, GatewayError> {
        let base_url = self.base_url.trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url).map_err(|_| GatewayError::InvalidUrl(base_url.clone()))?;

        let http = Client::builder().timeout(self.timeout).build()?;
        let credentials = self
            .credentials
            .unwrap_or_else(|| CredentialStore::open(Arc::new(MemoryStorage::new())));

        Ok(ApiGateway {
            inner: Arc::new(GatewayInner {
                http,
                base_url,
                credentials,
                refresh_policy: self.refresh_policy,
                on_unauthorized: self.on_unauthorized,
                refresh_lock: Mutex::new(()),
            }),
        })
    }
}

impl ApiGateway {
    pub fn builder(base_url: impl Into<String>) -> ApiGatewayBuilder {
        ApiGatewayBuilder {
            base_url: base_url.into(),
            credentials: None,
            refresh_policy: RefreshPolicy::default(),
            timeout: DEFAULT_TIMEOUT,
            on_unauthorized: None,
        }
    }

    /// Builder preloaded with URL, refresh policy and timeout from config
    pub fn from_config(config: &AppConfig) -> ApiGatewayBuilder {
        Self::builder(config.server_url.clone())
            .refresh_policy(config.refresh_policy)
            .timeout(Duration::from_secs(config.request_timeout_secs))
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.inner.credentials
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn refresh_policy(&self) -> RefreshPolicy {
        self.inner.refresh_policy
    }

    // ---- verb operations -------------------------------------------------

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        self.send(Method::GET, path, None).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, Some(encode(body)?)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PUT, path, Some(encode(body)?)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        self.send(Method::DELETE, path, None).await
    }

    /// Any method, optional JSON body
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, GatewayError> {
        self.execute(ApiRequest::new(method, path, body)).await
    }

    // ---- auth ------------------------------------------------------------

    /// Log in and store the resulting credential and profile
    pub async fn login(&self, email: &str, password: &str) -> Result<User, GatewayError> {
        let body = encode(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;
        let request =
            ApiRequest::new(Method::POST, "/api/auth/login", Some(body)).without_interception();
        let response: AuthResponse = self.execute(request).await?;
        Ok(self.establish(response))
    }

    /// Create the account and profile, then store the credential
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, GatewayError> {
        let request = ApiRequest::new(Method::POST, "/api/auth/register", Some(encode(request)?))
            .without_interception();
        let response: AuthResponse = self.execute(request).await?;
        Ok(self.establish(response))
    }

    /// End the server session; the local credential is cleared on success
    ///
    /// An expired access token is renewed first so the server session is
    /// still revoked. A failed logout never invokes the unauthorized handler.
    pub async fn logout(&self) -> Result<(), GatewayError> {
        let Some(credential) = self.inner.credentials.current() else {
            return Ok(());
        };
        let mut renewable = credential.refresh_token.is_some();
        if renewable && credential.is_expired_at(Utc::now()) {
            self.refresh_session().await?;
            renewable = false;
        }

        let request =
            ApiRequest::new(Method::POST, "/api/auth/logout", None).without_interception();
        let result = match self.execute::<MessageResponse>(request.clone()).await {
            Err(GatewayError::Unauthorized { .. }) if renewable => {
                tracing::debug!("Logout rejected, renewing the session once");
                self.refresh_session().await?;
                self.execute::<MessageResponse>(request).await
            }
            result => result,
        };
        result?;

        self.inner.credentials.clear();
        Ok(())
    }

    /// Resolve the current user and refresh the cached profile
    pub async fn me(&self) -> Result<User, GatewayError> {
        let user: User = self.get("/api/auth/me").await?;
        self.inner.credentials.set_user(user.clone());
        Ok(user)
    }

    /// Explicitly exchange the refresh token for a new credential
    pub async fn refresh_session(&self) -> Result<User, GatewayError> {
        let _guard = self.inner.refresh_lock.lock().await;
        let refresh_token = self
            .inner
            .credentials
            .current()
            .and_then(|c| c.refresh_token)
            .ok_or_else(GatewayError::session_expired)?;
        let response = self.request_refresh(refresh_token).await?;
        Ok(self.establish(response))
    }

    // ---- events ----------------------------------------------------------

    pub async fn list_events(&self) -> Result<Vec<Event>, GatewayError> {
        self.get("/api/events").await
    }

    pub async fn get_event(&self, id: Uuid) -> Result<Event, GatewayError> {
        self.get(&format!("/api/events/{}", id)).await
    }

    pub async fn create_event(&self, draft: &EventDraft) -> Result<Event, GatewayError> {
        self.post("/api/events", draft).await
    }

    pub async fn update_event(
        &self,
        id: Uuid,
        update: &EventUpdate,
    ) -> Result<Event, GatewayError> {
        self.put(&format!("/api/events/{}", id), update).await
    }

    pub async fn delete_event(&self, id: Uuid) -> Result<(), GatewayError> {
        let _: MessageResponse = self.delete(&format!("/api/events/{}", id)).await?;
        Ok(())
    }

    pub async fn register_for_event(&self, id: Uuid) -> Result<Event, GatewayError> {
        self.send(Method::POST, &format!("/api/events/{}/register", id), None)
            .await
    }

    pub async fn unregister_from_event(&self, id: Uuid) -> Result<Event, GatewayError> {
        self.delete(&format!("/api/events/{}/register", id)).await
    }

    // ---- internals -------------------------------------------------------

    fn establish(&self, response: AuthResponse) -> User {
        let credentials = &self.inner.credentials;
        credentials.set(Credential::from(&response));
        credentials.set_user(response.user.clone());
        tracing::info!("Session established for {}", response.user.email);
        response.user
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        mut request: ApiRequest,
    ) -> Result<T, GatewayError> {
        loop {
            let attached = self.inner.credentials.current();
            let response = self.dispatch(&request, attached.as_ref()).await?;

            if response.status() != StatusCode::UNAUTHORIZED || !request.intercept {
                return decode(response).await;
            }

            tracing::debug!(
                method = %request.method,
                path = %request.path,
                retried = request.retried,
                "Request rejected with 401"
            );

            if self.recover(&mut request, attached.as_ref()).await {
                continue;
            }
            return Err(GatewayError::session_expired());
        }
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        credential: Option<&Credential>,
    ) -> Result<reqwest::Response, GatewayError> {
        let url = format!("{}{}", self.inner.base_url, request.path);
        let mut builder = self.inner.http.request(request.method.clone(), &url);
        if let Some(credential) = credential {
            builder = builder.header(AUTHORIZATION, credential.authorization());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            authenticated = credential.is_some(),
            "Sending request"
        );
        Ok(builder.send().await?)
    }

    /// Handle a 401 for `request`, sent with `rejected`; true to retry
    ///
    /// Runs under the refresh lock, so concurrent rejections of one
    /// credential share a single refresh and, when that fails, a single
    /// forced logout.
    async fn recover(&self, request: &mut ApiRequest, rejected: Option<&Credential>) -> bool {
        let _guard = self.inner.refresh_lock.lock().await;

        let current = match (self.inner.credentials.current(), rejected) {
            (Some(current), Some(rejected)) if current.access_token == rejected.access_token => {
                current
            }
            (Some(_), _) => {
                tracing::debug!("Credential replaced while the request was in flight");
                return retry_once(request);
            }
            (None, Some(_)) => {
                tracing::debug!("Session already dropped by another request");
                return false;
            }
            (None, None) => {
                self.notify_unauthorized();
                return false;
            }
        };

        if self.inner.refresh_policy == RefreshPolicy::Refresh && retry_once(request) {
            match current.refresh_token.clone() {
                Some(refresh_token) => match self.request_refresh(refresh_token).await {
                    Ok(response) => {
                        self.establish(response);
                        tracing::info!("Credential refreshed");
                        return true;
                    }
                    Err(e) => tracing::warn!("Credential refresh failed: {}", e),
                },
                None => tracing::debug!("No refresh token available"),
            }
        }

        if self.inner.credentials.clear_if_current(&current) {
            tracing::warn!("Session rejected by server, clearing credentials");
            self.notify_unauthorized();
        }
        false
    }

    async fn request_refresh(&self, refresh_token: String) -> Result<AuthResponse, GatewayError> {
        let body = encode(&RefreshRequest { refresh_token })?;
        let request =
            ApiRequest::new(Method::POST, "/api/auth/refresh", Some(body)).without_interception();
        let response = self.dispatch(&request, None).await?;
        decode(response).await
    }

    fn notify_unauthorized(&self) {
        if let Some(handler) = &self.inner.on_unauthorized {
            handler();
        }
    }
}

impl fmt::Debug for ApiGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiGateway")
            .field("base_url", &self.inner.base_url)
            .field("refresh_policy", &self.inner.refresh_policy)
            .finish()
    }
}

/// Mark `request` as retried; false when it already was
fn retry_once(request: &mut ApiRequest) -> bool {
    !std::mem::replace(&mut request.retried, true)
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<serde_json::Value, GatewayError> {
    serde_json::to_value(body).map_err(|e| GatewayError::Encode(e.to_string()))
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, GatewayError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if status.is_success() {
        let body: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
        return serde_json::from_slice(body).map_err(|e| GatewayError::Decode(e.to_string()));
    }

    let message = serde_json::from_slice::<ErrorEnvelope>(&bytes)
        .ok()
        .and_then(|envelope| envelope.message.or(envelope.error))
        .unwrap_or_else(|| {
            let text = String::from_utf8_lossy(&bytes).trim().to_string();
            if text.is_empty() {
                status.canonical_reason().unwrap_or("Request failed").to_string()
            } else {
                text
            }
        });

    let code = status.as_u16();
    Err(match code {
        401 => GatewayError::Unauthorized { message },
        400..=499 => GatewayError::Api { status: code, message },
        _ => GatewayError::Server { status: code, message },
    })
}
