//! API gateway tests against a scripted backend (wiremock)

mod common;

use std::time::Duration;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{auth_json, event_json, user_json, TestClient, TEST_EMAIL, TEST_PASSWORD};
use eventboard::client::{Credential, GatewayError, PersistedSession};
use eventboard::shared::RefreshPolicy;

fn signed_in(token: &str, refresh_token: Option<&str>) -> PersistedSession {
    let mut credential = Credential::new(token);
    if let Some(refresh_token) = refresh_token {
        credential = credential.with_refresh_token(refresh_token);
    }
    PersistedSession {
        token: Some(credential),
        user: serde_json::from_value(user_json(Uuid::new_v4(), TEST_EMAIL, "worker")).ok(),
    }
}

#[tokio::test]
async fn test_login_stores_credential_and_sends_bearer() {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "email": TEST_EMAIL, "password": TEST_PASSWORD })))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_json(
            "access-1",
            "refresh-1",
            user_json(user_id, TEST_EMAIL, "worker"),
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/events"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = TestClient::new(&server.uri());
    let user = client.gateway.login(TEST_EMAIL, TEST_PASSWORD).await.unwrap();
    assert_eq!(user.id, user_id);

    let stored = client.storage.snapshot();
    assert_eq!(stored.token.map(|c| c.access_token), Some("access-1".to_string()));
    assert_eq!(stored.user.map(|u| u.id), Some(user_id));

    let events = client.gateway.list_events().await.unwrap();
    assert!(events.is_empty());
}

#[tokio::test]
async fn test_invalid_login_surfaces_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "message": "Invalid credentials", "status": 401 })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = TestClient::new(&server.uri());
    let err = client.gateway.login(TEST_EMAIL, "wrongpw").await.unwrap_err();

    assert_eq!(err.user_message(), "Invalid credentials");
    assert!(client.storage.snapshot().is_empty());
    assert_eq!(client.unauthorized.count(), 0);
}

#[tokio::test]
async fn test_no_authorization_header_without_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(move |request: &wiremock::Request| {
            assert!(request.headers.get("authorization").is_none());
            ResponseTemplate::new(201).set_body_json(auth_json(
                "access-1",
                "refresh-1",
                user_json(Uuid::new_v4(), "new@example.com", "worker"),
            ))
        })
        .expect(1)
        .mount(&server)
        .await;

    let client = TestClient::new(&server.uri());
    let request = eventboard::shared::RegisterRequest {
        email: "new@example.com".to_string(),
        password: "longenough".to_string(),
        name: "New".to_string(),
        role: Default::default(),
    };
    client.gateway.register(&request).await.unwrap();
    assert!(client.gateway.credentials().has_credential());
}

#[tokio::test]
async fn test_refresh_and_retry_on_401() {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/api/events"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(json!({ "refresh_token": "refresh-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_json(
            "fresh",
            "refresh-2",
            user_json(user_id, TEST_EMAIL, "worker"),
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/events"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([event_json(Uuid::new_v4(), 2, &[])])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = TestClient::with_session(
        &server.uri(),
        signed_in("stale", Some("refresh-1")),
        RefreshPolicy::Refresh,
    );
    let events = client.gateway.list_events().await.unwrap();

    assert_eq!(events.len(), 1);
    let credential = client.gateway.credentials().current().unwrap();
    assert_eq!(credential.access_token, "fresh");
    assert_eq!(credential.refresh_token.as_deref(), Some("refresh-2"));
    assert_eq!(client.unauthorized.count(), 0);
}

#[tokio::test]
async fn test_retry_rejected_again_does_not_refresh_twice() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/events"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_json(
            "fresh",
            "refresh-2",
            user_json(Uuid::new_v4(), TEST_EMAIL, "worker"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = TestClient::with_session(
        &server.uri(),
        signed_in("stale", Some("refresh-1")),
        RefreshPolicy::Refresh,
    );
    let err = client.gateway.list_events().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(client.storage.snapshot().is_empty());
    assert_eq!(client.unauthorized.count(), 1);
}

#[tokio::test]
async fn test_failed_refresh_clears_session_and_redirects() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(
            json!({ "message": "Invalid or expired refresh token", "status": 401 }),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = TestClient::with_session(
        &server.uri(),
        signed_in("stale", Some("refresh-1")),
        RefreshPolicy::Refresh,
    );
    let mut identity = client.gateway.credentials().on_identity_change();

    let err = client.gateway.me().await.unwrap_err();

    assert_matches!(err, GatewayError::Unauthorized { .. });
    assert!(client.gateway.credentials().current().is_none());
    assert!(client.storage.snapshot().is_empty());
    assert_eq!(client.unauthorized.count(), 1);
    assert!(identity.has_changed().unwrap());
    assert!(identity.borrow_and_update().is_none());
}

#[tokio::test]
async fn test_no_refresh_policy_drops_session_immediately() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/events"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = TestClient::with_session(
        &server.uri(),
        signed_in("stale", Some("refresh-1")),
        RefreshPolicy::NoRefresh,
    );
    let err = client.gateway.list_events().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(client.storage.snapshot().is_empty());
    assert_eq!(client.unauthorized.count(), 1);
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/events"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_json(
            "fresh",
            "refresh-2",
            user_json(Uuid::new_v4(), TEST_EMAIL, "worker"),
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/events"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(3)
        .mount(&server)
        .await;

    let client = TestClient::with_session(
        &server.uri(),
        signed_in("stale", Some("refresh-1")),
        RefreshPolicy::Refresh,
    );
    let gateway = &client.gateway;
    let (a, b, c) = tokio::join!(
        gateway.list_events(),
        gateway.list_events(),
        gateway.list_events()
    );

    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert_eq!(client.unauthorized.count(), 0);
}

#[tokio::test]
async fn test_concurrent_401s_with_failed_refresh_log_out_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/events"))
        .respond_with(ResponseTemplate::new(401))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(
            json!({ "message": "Invalid or expired refresh token", "status": 401 }),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = TestClient::with_session(
        &server.uri(),
        signed_in("stale", Some("refresh-1")),
        RefreshPolicy::Refresh,
    );
    let gateway = &client.gateway;
    let (a, b, c) = tokio::join!(
        gateway.list_events(),
        gateway.list_events(),
        gateway.list_events()
    );

    for result in [a, b, c] {
        assert!(result.unwrap_err().is_unauthorized());
    }
    assert!(client.storage.snapshot().is_empty());
    assert_eq!(client.unauthorized.count(), 1);
}

#[tokio::test]
async fn test_late_401_leaves_newer_credential_alone() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/events"))
        .and(header("authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(300)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/events"))
        .and(header("authorization", "Bearer new-after-login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = TestClient::with_session(
        &server.uri(),
        signed_in("old", None),
        RefreshPolicy::NoRefresh,
    );
    let gateway = client.gateway.clone();
    let pending = tokio::spawn(async move { gateway.list_events().await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    client.gateway.credentials().set(Credential::new("new-after-login"));

    let events = pending.await.unwrap().unwrap();
    assert!(events.is_empty());
    assert_eq!(
        client.gateway.credentials().current().map(|c| c.access_token),
        Some("new-after-login".to_string())
    );
    assert_eq!(
        client.storage.snapshot().token.map(|c| c.access_token),
        Some("new-after-login".to_string())
    );
    assert_eq!(client.unauthorized.count(), 0);
}

#[tokio::test]
async fn test_logout_renews_rejected_access_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(json!({ "refresh_token": "refresh-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_json(
            "fresh",
            "refresh-2",
            user_json(Uuid::new_v4(), TEST_EMAIL, "worker"),
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Logged out" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = TestClient::with_session(
        &server.uri(),
        signed_in("stale", Some("refresh-1")),
        RefreshPolicy::Refresh,
    );
    client.gateway.logout().await.unwrap();

    assert!(client.storage.snapshot().is_empty());
    assert_eq!(client.unauthorized.count(), 0);
}

#[tokio::test]
async fn test_logout_with_expired_credential_refreshes_first() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_json(
            "fresh",
            "refresh-2",
            user_json(Uuid::new_v4(), TEST_EMAIL, "worker"),
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Logged out" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = signed_in("expired", Some("refresh-1"));
    if let Some(credential) = session.token.as_mut() {
        credential.expires_at = Some(chrono::Utc::now() - chrono::Duration::minutes(1));
    }
    let client = TestClient::with_session(&server.uri(), session, RefreshPolicy::Refresh);
    client.gateway.logout().await.unwrap();

    assert!(client.storage.snapshot().is_empty());
}

#[tokio::test]
async fn test_business_error_is_verbatim() {
    let server = MockServer::start().await;
    let event_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path(format!("/api/events/{}/register", event_id)))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_json(json!({ "message": "Event is full", "status": 409 })),
        )
        .mount(&server)
        .await;

    let client = TestClient::with_session(
        &server.uri(),
        signed_in("access-1", None),
        RefreshPolicy::Refresh,
    );
    let err = client.gateway.register_for_event(event_id).await.unwrap_err();

    assert_matches!(err, GatewayError::Api { status: 409, .. });
    assert_eq!(err.user_message(), "Event is full");
    assert!(client.gateway.credentials().has_credential());
}

#[tokio::test]
async fn test_server_error_is_generic() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "message": "database is locked", "status": 500 })),
        )
        .mount(&server)
        .await;

    let client = TestClient::with_session(
        &server.uri(),
        signed_in("access-1", None),
        RefreshPolicy::Refresh,
    );
    let err = client.gateway.list_events().await.unwrap_err();

    assert_matches!(err, GatewayError::Server { status: 500, .. });
    assert!(!err.user_message().contains("database"));
}

#[tokio::test]
async fn test_unregister_uses_delete_on_registration_path() {
    let server = MockServer::start().await;
    let event_id = Uuid::new_v4();

    Mock::given(method("DELETE"))
        .and(path(format!("/api/events/{}/register", event_id)))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(event_json(event_id, 3, &[])))
        .expect(1)
        .mount(&server)
        .await;

    let client = TestClient::with_session(
        &server.uri(),
        signed_in("access-1", None),
        RefreshPolicy::Refresh,
    );
    let event = client.gateway.unregister_from_event(event_id).await.unwrap();
    assert_eq!(event.id, event_id);
    assert!(event.registered_users.is_empty());
}

#[tokio::test]
async fn test_transport_failure_is_not_retried() {
    // nothing listens on the discard port
    let client = TestClient::with_session(
        "http://127.0.0.1:9",
        signed_in("access-1", Some("refresh-1")),
        RefreshPolicy::Refresh,
    );
    let err = client.gateway.list_events().await.unwrap_err();

    assert_matches!(err, GatewayError::Transport(_));
    assert!(client.gateway.credentials().has_credential());
    assert_eq!(client.unauthorized.count(), 0);
}
