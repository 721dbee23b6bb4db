//! Tests for the auth module

use super::*;
use crate::error::Error;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session(server: &MockServer) -> AuthConfig {
    AuthConfig::Session {
        login_url: format!("{}/auth/authenticate", server.uri()),
        key: "my-key".to_string(),
        secret: "my-secret".to_string(),
        token_path: DEFAULT_TOKEN_PATH.to_string(),
        token_header: DEFAULT_TOKEN_HEADER.to_string(),
    }
}

#[tokio::test]
async fn test_no_auth() {
    let auth = Authenticator::new(AuthConfig::None);
    let client = reqwest::Client::new();
    let req = client.get("https://example.com/api");

    let built = auth.apply(req).await.unwrap().build().unwrap();
    assert!(built.headers().get(DEFAULT_TOKEN_HEADER).is_none());
}

#[tokio::test]
async fn test_static_token() {
    let auth = Authenticator::new(AuthConfig::Token {
        header: "X-Auth-Token".to_string(),
        token: "fixed".to_string(),
    });

    let client = reqwest::Client::new();
    let req = client.get("https://example.com/api");
    let built = auth.apply(req).await.unwrap().build().unwrap();

    assert_eq!(built.headers().get("X-Auth-Token").unwrap(), "fixed");
}

#[tokio::test]
async fn test_session_login_sends_key_and_secret() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/authenticate"))
        .and(body_json(json!({"key": "my-key", "secret": "my-secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "tok-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let auth = Authenticator::new(session(&server));
    let client = reqwest::Client::new();

    // Two requests, one login
    for _ in 0..2 {
        let req = client.get("https://example.com/api");
        let built = auth.apply(req).await.unwrap().build().unwrap();
        assert_eq!(built.headers().get("X-Auth-Token").unwrap(), "tok-1");
    }
    assert!(auth.has_token().await);
}

#[tokio::test]
async fn test_session_login_failure_reports_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/authenticate"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let auth = Authenticator::new(session(&server));
    let req = reqwest::Client::new().get("https://example.com/api");
    let err = auth.apply(req).await.unwrap_err();

    assert!(matches!(err, Error::AuthStatus { status: 403 }));
    assert_eq!(err.to_string(), "Failed to authenticate. Status code: 403");
}

#[tokio::test]
async fn test_session_login_missing_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/authenticate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    let auth = Authenticator::new(session(&server));
    let req = reqwest::Client::new().get("https://example.com/api");
    let err = auth.apply(req).await.unwrap_err();

    assert!(matches!(err, Error::Auth { .. }));
}

#[tokio::test]
async fn test_session_login_non_string_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/authenticate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": 123})))
        .mount(&server)
        .await;

    let auth = Authenticator::new(session(&server));
    let req = reqwest::Client::new().get("https://example.com/api");
    let err = auth.apply(req).await.unwrap_err();

    assert!(matches!(err, Error::Auth { .. }));
    assert!(!auth.has_token().await);
}

#[tokio::test]
async fn test_concurrent_callers_share_one_login() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/authenticate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"token": "shared"}))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let auth = Arc::new(Authenticator::new(session(&server)));
    let client = reqwest::Client::new();

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let auth = Arc::clone(&auth);
            let req = client.get("https://example.com/api");
            tokio::spawn(async move { auth.apply(req).await })
        })
        .collect();

    for handle in handles {
        let built = handle.await.unwrap().unwrap().build().unwrap();
        assert_eq!(built.headers().get("X-Auth-Token").unwrap(), "shared");
    }
}

#[tokio::test]
async fn test_invalidate_forces_new_login() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/authenticate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "tok"})))
        .expect(2)
        .mount(&server)
        .await;

    let auth = Authenticator::new(session(&server));
    let client = reqwest::Client::new();

    let first = auth.apply(client.get("https://example.com/a")).await.unwrap();
    assert_eq!(first.build().unwrap().headers().get("X-Auth-Token").unwrap(), "tok");
    auth.invalidate().await;
    assert!(!auth.has_token().await);
    let second = auth.apply(client.get("https://example.com/b")).await.unwrap();
    assert_eq!(second.build().unwrap().headers().get("X-Auth-Token").unwrap(), "tok");
}

#[test]
fn test_extract_jsonpath() {
    let value = json!({"token": "abc", "data": {"token": "nested", "ttl": 3600}, "empty": ""});

    assert_eq!(extract_jsonpath(&value, "token"), Some("abc".to_string()));
    assert_eq!(extract_jsonpath(&value, "$.data.token"), Some("nested".to_string()));
    assert_eq!(extract_jsonpath(&value, "data.ttl"), None);
    assert_eq!(extract_jsonpath(&value, "missing"), None);
    assert_eq!(extract_jsonpath(&value, "data"), None);
    assert_eq!(extract_jsonpath(&value, "empty"), None);
}
