//! Mock API tests for login and logout.

mod common;

use bazaar_core::{Credentials, Error, ErrorKind, SessionKey, SessionStore};
use common::{client_with, empty_store, logged_in_store, mock_config};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_success_persists_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({
            "email": "ada@example.com",
            "password": "secret123"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "t1",
            "refresh_token": "r1",
            "user": {"id": 42, "email": "ada@example.com", "name": "Ada", "role": "seller"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let t = client_with(mock_config(&server), empty_store());
    let session = t
        .client
        .login(&Credentials::new("ada@example.com", "secret123"))
        .await
        .unwrap();

    assert!(session.is_authenticated());
    let user = session.user.unwrap();
    assert_eq!(user.name.as_deref(), Some("Ada"));
    assert_eq!(user.extra["role"], "seller");

    assert_eq!(t.store.get(SessionKey::AccessToken).as_deref(), Some("t1"));
    assert_eq!(t.store.get(SessionKey::RefreshToken).as_deref(), Some("r1"));
    let stored: Value = serde_json::from_str(&t.store.get(SessionKey::User).unwrap()).unwrap();
    assert_eq!(stored["id"], 42);
}

#[tokio::test]
async fn test_login_invalid_credentials_does_not_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "InvalidCredentials",
            "message": "Invalid email or password"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let t = client_with(mock_config(&server), empty_store());
    let err = t
        .client
        .login(&Credentials::new("ada@example.com", "wrong"))
        .await
        .unwrap_err();

    match &err {
        Error::Client(e) => {
            assert_eq!(e.status, 401);
            assert_eq!(e.message.as_deref(), Some("Invalid email or password"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(t.reporter.kinds(), vec![Some(ErrorKind::ClientError(401))]);
    assert!(t.store.get(SessionKey::AccessToken).is_none());
    assert_eq!(t.navigator.visits(), 0);

    server.verify().await;
}

// ============================================================================
// Logout
// ============================================================================

#[tokio::test]
async fn test_logout_revokes_and_clears() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(header("authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let t = client_with(mock_config(&server), logged_in_store());
    t.client.logout().await;

    for key in SessionKey::ALL {
        assert!(t.store.get(key).is_none());
    }
    server.verify().await;
}

#[tokio::test]
async fn test_logout_clears_even_when_server_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let t = client_with(mock_config(&server), logged_in_store());
    t.client.logout().await;

    assert!(!t.client.session().is_authenticated());
    assert!(t.reporter.kinds().is_empty());
    server.verify().await;
}

#[tokio::test]
async fn test_logout_without_session_is_noop() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let t = client_with(mock_config(&server), empty_store());
    t.client.logout().await;
    t.client.logout().await;

    assert!(!t.client.session().is_authenticated());
    server.verify().await;
}
