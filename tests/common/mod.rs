//! Common test utilities and helpers
//!
//! - JSON fixtures in the shapes the API returns
//! - Gateways over in-memory session storage
//! - A real backend on an ephemeral port (`ssr` only)

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use eventboard::client::{ApiGateway, CredentialStore, MemoryStorage, PersistedSession};
use eventboard::shared::RefreshPolicy;

pub const TEST_EMAIL: &str = "user@example.com";
pub const TEST_PASSWORD: &str = "correctpw";

pub fn user_json(id: Uuid, email: &str, role: &str) -> Value {
    json!({
        "id": id,
        "email": email,
        "name": "Test User",
        "role": role,
    })
}

pub fn auth_json(token: &str, refresh_token: &str, user: Value) -> Value {
    json!({
        "token": token,
        "refresh_token": refresh_token,
        "user": user,
    })
}

pub fn event_json(id: Uuid, required_workers: u32, registered_users: &[Uuid]) -> Value {
    let now = Utc::now();
    json!({
        "id": id,
        "title": "Beach cleanup",
        "description": "Bring gloves",
        "date": now,
        "required_workers": required_workers,
        "registered_users": registered_users,
        "created_by": Uuid::new_v4(),
        "created_at": now,
        "updated_at": now,
    })
}

/// Counts calls of the gateway's unauthorized handler
#[derive(Clone, Default)]
pub struct UnauthorizedCounter(Arc<AtomicUsize>);

impl UnauthorizedCounter {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Gateway with its storage and unauthorized-handler counter
pub struct TestClient {
    pub gateway: ApiGateway,
    pub storage: Arc<MemoryStorage>,
    pub unauthorized: UnauthorizedCounter,
}

impl TestClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_session(base_url, PersistedSession::default(), RefreshPolicy::Refresh)
    }

    pub fn with_session(base_url: &str, session: PersistedSession, policy: RefreshPolicy) -> Self {
        let storage = Arc::new(MemoryStorage::with_session(session));
        let unauthorized = UnauthorizedCounter::default();
        let counter = unauthorized.0.clone();

        let gateway = ApiGateway::builder(base_url)
            .credentials(CredentialStore::open(storage.clone()))
            .refresh_policy(policy)
            .on_unauthorized(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .expect("gateway builds");

        Self {
            gateway,
            storage,
            unauthorized,
        }
    }
}

/// Boot the real backend over in-memory SQLite; returns its base URL
#[cfg(feature = "ssr")]
pub async fn spawn_server() -> String {
    use eventboard::backend::{create_app, ServerConfig};

    let config = ServerConfig {
        database_url: "sqlite::memory:".to_string(),
        bcrypt_cost: 4,
        ..ServerConfig::default()
    };
    let app = create_app(config).await.expect("app starts");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server runs");
    });

    format!("http://{}", addr)
}
